//! Tag vocabulary and the wanted/unwanted matcher.
//!
//! Tags are validated against the detector's fixed label vocabulary while the
//! configuration is built, so an unknown tag is a configuration error and never
//! a silent runtime miss.

use crate::error::{CoreResult, config_error};
use std::fmt;

/// Labels emitted by the supported detector.
pub const DETECTOR_LABELS: &[&str] = &[
    "EXPOSED_ANUS",
    "EXPOSED_ARMPITS",
    "COVERED_BELLY",
    "EXPOSED_BELLY",
    "COVERED_BUTTOCKS",
    "EXPOSED_BUTTOCKS",
    "FACE_F",
    "FACE_M",
    "COVERED_FEET",
    "EXPOSED_FEET",
    "COVERED_BREAST_F",
    "EXPOSED_BREAST_F",
    "COVERED_GENITALIA_F",
    "EXPOSED_GENITALIA_F",
    "EXPOSED_BREAST_M",
    "EXPOSED_GENITALIA_M",
];

/// Family names covering the gendered variants of a label (`FACE` matches
/// `FACE_F` and `FACE_M`).
pub const TAG_FAMILIES: &[&str] = &[
    "FACE",
    "COVERED_BREAST",
    "EXPOSED_BREAST",
    "COVERED_GENITALIA",
    "EXPOSED_GENITALIA",
];

/// Wanted-list value that disables processing altogether.
pub const NONE_SENTINEL: &str = "NONE";

/// A validated vocabulary entry: either a detector label or a family name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// Validates a single tag. Case is normalised to upper case.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let name = raw.trim().to_ascii_uppercase();
        if name.is_empty() {
            return Err(config_error("empty tag name"));
        }
        if DETECTOR_LABELS.contains(&name.as_str()) || TAG_FAMILIES.contains(&name.as_str()) {
            Ok(Self(name))
        } else {
            Err(config_error(format!(
                "unknown tag '{}' (run `scenesift tags` for the vocabulary)",
                raw.trim()
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a label reported by the detector belongs to this tag.
    #[must_use]
    pub fn matches_label(&self, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        label == self.0
            || (TAG_FAMILIES.contains(&self.0.as_str())
                && label
                    .strip_prefix(self.0.as_str())
                    .is_some_and(|rest| rest.starts_with('_')))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses a comma-separated tag list. Blank entries are skipped, so an empty
/// string yields an empty list.
pub fn parse_tag_list(list: &str) -> CoreResult<Vec<Tag>> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(Tag::parse)
        .collect()
}

/// The user's choice of wanted tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelection {
    /// The `NONE` sentinel: match nothing and skip the whole pipeline.
    Nothing,
    /// At least one tag to look for.
    Tags(Vec<Tag>),
}

impl TagSelection {
    /// Parses a wanted list. A list whose first entry is `NONE` selects nothing.
    pub fn parse_wanted(list: &str) -> CoreResult<Self> {
        let first = list.split(',').map(str::trim).find(|item| !item.is_empty());
        if first.is_some_and(|item| item.eq_ignore_ascii_case(NONE_SENTINEL)) {
            return Ok(TagSelection::Nothing);
        }

        let tags = parse_tag_list(list)?;
        if tags.is_empty() {
            return Err(config_error("wanted tag list is empty"));
        }
        Ok(TagSelection::Tags(tags))
    }

    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, TagSelection::Nothing)
    }
}

impl fmt::Display for TagSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSelection::Nothing => f.write_str(NONE_SENTINEL),
            TagSelection::Tags(tags) => f.write_str(&join_tags(tags)),
        }
    }
}

/// Joins tags with commas, the same shape [`parse_tag_list`] accepts.
pub fn join_tags(tags: &[Tag]) -> String {
    tags.iter().map(Tag::as_str).collect::<Vec<_>>().join(",")
}

/// Decides whether a sample's labels make it a match.
///
/// A sample matches when any wanted tag is present and no unwanted tag is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatcher {
    wanted: Vec<Tag>,
    unwanted: Vec<Tag>,
}

impl TagMatcher {
    pub fn new(wanted: Vec<Tag>, unwanted: Vec<Tag>) -> Self {
        Self { wanted, unwanted }
    }

    pub fn wanted(&self) -> &[Tag] {
        &self.wanted
    }

    pub fn unwanted(&self) -> &[Tag] {
        &self.unwanted
    }

    /// Applies the wanted/unwanted predicate to one sample's labels.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, labels: &[S]) -> bool {
        let has_any = |tags: &[Tag]| {
            tags.iter()
                .any(|tag| labels.iter().any(|label| tag.matches_label(label.as_ref())))
        };
        has_any(&self.wanted) && !has_any(&self.unwanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(wanted: &str, unwanted: &str) -> TagMatcher {
        TagMatcher::new(
            parse_tag_list(wanted).unwrap(),
            parse_tag_list(unwanted).unwrap(),
        )
    }

    #[test]
    fn test_unknown_tag_is_a_config_error() {
        let err = parse_tag_list("EXPOSED_BELLY,NOT_A_TAG").unwrap_err();
        assert!(err.to_string().contains("NOT_A_TAG"));
    }

    #[test]
    fn test_tags_are_case_normalised() {
        let tags = parse_tag_list(" exposed_belly , Face_F").unwrap();
        assert_eq!(join_tags(&tags), "EXPOSED_BELLY,FACE_F");
    }

    #[test]
    fn test_family_matches_gendered_labels() {
        let tag = Tag::parse("EXPOSED_BREAST").unwrap();
        assert!(tag.matches_label("EXPOSED_BREAST_F"));
        assert!(tag.matches_label("EXPOSED_BREAST_M"));
        assert!(!tag.matches_label("COVERED_BREAST_F"));
    }

    #[test]
    fn test_plain_label_matches_exactly() {
        let tag = Tag::parse("FACE_F").unwrap();
        assert!(tag.matches_label("FACE_F"));
        assert!(!tag.matches_label("FACE_M"));
    }

    #[test]
    fn test_any_wanted_and_no_unwanted() {
        let m = matcher("EXPOSED_BELLY,EXPOSED_FEET", "FACE_M");
        assert!(m.matches(&["EXPOSED_FEET", "FACE_F"]));
        assert!(!m.matches(&["EXPOSED_FEET", "FACE_M"]));
        assert!(!m.matches(&["FACE_F"]));
        assert!(!m.matches::<&str>(&[]));
    }

    #[test]
    fn test_empty_unwanted_entries_never_exclude() {
        let m = matcher("EXPOSED_BELLY", " , ,");
        assert!(m.unwanted().is_empty());
        assert!(m.matches(&["EXPOSED_BELLY", ""]));
    }

    #[test]
    fn test_none_sentinel_selects_nothing() {
        assert_eq!(TagSelection::parse_wanted("NONE").unwrap(), TagSelection::Nothing);
        assert_eq!(TagSelection::parse_wanted("none,FACE_F").unwrap(), TagSelection::Nothing);
    }

    #[test]
    fn test_empty_wanted_list_is_rejected() {
        assert!(TagSelection::parse_wanted(" , ").is_err());
    }
}
