// ============================================================================
// scenesift-core/src/config/presets.rs
// ============================================================================
//
// PRESETS: Named Parameter Sets From a JSON File
//
// A preset file carries file-wide defaults and a list of named presets
// ("models"), each optionally scoped to a site and optionally inheriting from
// another preset by name:
//
//   {
//     "default": "EXPOSED_BREAST,EXPOSED_BUTTOCKS",
//     "unwanted": "FACE_M",
//     "videoext": "mp4",
//     "models": [
//       { "name": "base", "interval": 10, "cut": 20 },
//       { "name": "alice", "site": "example", "inherit": "base", "search": "FACE_F" }
//     ]
//   }
//
// Every field is optional. Resolution produces a PresetOverrides value that
// the config builder layers over its defaults; command-line flags are layered
// on top of that by the caller.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult, config_error};

/// Parsed preset file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetFile {
    /// File-wide wanted tags
    #[serde(default)]
    pub default: Option<String>,

    /// File-wide unwanted tags
    #[serde(default)]
    pub unwanted: Option<String>,

    /// File-wide output container extension
    #[serde(default)]
    pub videoext: Option<String>,

    #[serde(default)]
    pub models: Vec<Preset>,
}

/// One named entry of the preset file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub interval: Option<f64>,
    #[serde(default)]
    pub cut: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub extension: Option<f64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub unwanted: Option<String>,
    #[serde(default)]
    pub begin: Option<f64>,
    #[serde(default)]
    pub finish: Option<f64>,
    /// Name of the preset this one starts from
    #[serde(default)]
    pub inherit: Option<String>,
}

/// Partial settings; `None` leaves the lower layer untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetOverrides {
    pub sample_interval: Option<f64>,
    pub gap_threshold: Option<f64>,
    pub min_duration: Option<f64>,
    pub extension: Option<f64>,
    pub skip_begin: Option<f64>,
    pub skip_finish: Option<f64>,
    pub wanted: Option<String>,
    pub unwanted: Option<String>,
    pub video_ext: Option<String>,
}

impl PresetOverrides {
    /// Layers `upper` over `self`; values set in `upper` win.
    #[must_use]
    pub fn overlay(self, upper: PresetOverrides) -> PresetOverrides {
        PresetOverrides {
            sample_interval: upper.sample_interval.or(self.sample_interval),
            gap_threshold: upper.gap_threshold.or(self.gap_threshold),
            min_duration: upper.min_duration.or(self.min_duration),
            extension: upper.extension.or(self.extension),
            skip_begin: upper.skip_begin.or(self.skip_begin),
            skip_finish: upper.skip_finish.or(self.skip_finish),
            wanted: upper.wanted.or(self.wanted),
            unwanted: upper.unwanted.or(self.unwanted),
            video_ext: upper.video_ext.or(self.video_ext),
        }
    }
}

impl From<&Preset> for PresetOverrides {
    fn from(preset: &Preset) -> Self {
        PresetOverrides {
            sample_interval: preset.interval,
            gap_threshold: preset.cut,
            min_duration: preset.duration,
            extension: preset.extension,
            skip_begin: preset.begin,
            skip_finish: preset.finish,
            wanted: preset.search.clone(),
            unwanted: preset.unwanted.clone(),
            video_ext: None,
        }
    }
}

impl PresetFile {
    /// Reads and parses a preset file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            config_error(format!("cannot read preset file {}: {e}", path.display()))
        })?;
        Self::from_json(&text).map_err(|e| match e {
            CoreError::JsonParseError(msg) => {
                CoreError::JsonParseError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_json(text: &str) -> CoreResult<Self> {
        serde_json::from_str(text).map_err(|e| CoreError::JsonParseError(e.to_string()))
    }

    /// Looks a preset up by name, preferring an entry whose site also matches.
    ///
    /// Comparison ignores ASCII case.
    #[must_use]
    pub fn find(&self, name: &str, site: Option<&str>) -> Option<&Preset> {
        let same_name = |p: &&Preset| p.name.eq_ignore_ascii_case(name);

        site.and_then(|site| {
            self.models.iter().filter(same_name).find(|p| {
                p.site
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(site))
            })
        })
        .or_else(|| self.models.iter().find(same_name))
    }

    /// File-wide values only.
    #[must_use]
    pub fn file_overrides(&self) -> PresetOverrides {
        PresetOverrides {
            wanted: self.default.clone(),
            unwanted: self.unwanted.clone(),
            video_ext: self.videoext.clone(),
            ..PresetOverrides::default()
        }
    }

    /// Resolves the overrides for a preset: file-wide values, then each
    /// ancestor of the inheritance chain from the root down, then the preset.
    ///
    /// An unknown preset name falls back to the file-wide values with a
    /// warning. A dangling `inherit` name or an inheritance cycle is an error.
    pub fn overrides_for(&self, name: &str, site: Option<&str>) -> CoreResult<PresetOverrides> {
        let base = self.file_overrides();

        let Some(preset) = self.find(name, site) else {
            log::warn!("Preset '{name}' not found in preset file; using file-wide defaults");
            return Ok(base);
        };

        let chain = self.inheritance_chain(preset)?;
        Ok(chain
            .into_iter()
            .rev()
            .fold(base, |acc, p| acc.overlay(PresetOverrides::from(p))))
    }

    /// The preset followed by its ancestors, nearest first.
    fn inheritance_chain<'a>(&'a self, preset: &'a Preset) -> CoreResult<Vec<&'a Preset>> {
        let mut chain = vec![preset];
        let mut seen = HashSet::from([preset.name.to_ascii_lowercase()]);
        let mut current = preset;

        while let Some(parent_name) = current.inherit.as_deref() {
            let parent = self
                .models
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(parent_name))
                .ok_or_else(|| {
                    config_error(format!(
                        "preset '{}' inherits from unknown preset '{parent_name}'",
                        current.name
                    ))
                })?;

            if !seen.insert(parent.name.to_ascii_lowercase()) {
                return Err(config_error(format!(
                    "preset inheritance cycle through '{}'",
                    parent.name
                )));
            }

            chain.push(parent);
            current = parent;
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "default": "EXPOSED_BELLY",
        "unwanted": "FACE_M",
        "videoext": "mkv",
        "models": [
            { "name": "base", "interval": 10, "cut": 20, "begin": 5 },
            { "name": "Alice", "inherit": "base", "search": "FACE_F", "cut": 40 },
            { "name": "alice", "site": "elsewhere", "interval": 99 }
        ]
    }"#;

    #[test]
    fn test_inherit_chain_layers_from_root() {
        let file = PresetFile::from_json(SAMPLE).unwrap();
        let resolved = file.overrides_for("ALICE", None).unwrap();

        assert_eq!(resolved.sample_interval, Some(10.0));
        assert_eq!(resolved.gap_threshold, Some(40.0));
        assert_eq!(resolved.skip_begin, Some(5.0));
        assert_eq!(resolved.wanted.as_deref(), Some("FACE_F"));
        assert_eq!(resolved.unwanted.as_deref(), Some("FACE_M"));
        assert_eq!(resolved.video_ext.as_deref(), Some("mkv"));
    }

    #[test]
    fn test_site_match_is_preferred() {
        let file = PresetFile::from_json(SAMPLE).unwrap();
        let preset = file.find("alice", Some("ELSEWHERE")).unwrap();
        assert_eq!(preset.interval, Some(99.0));

        let fallback = file.find("alice", Some("unknown-site")).unwrap();
        assert_eq!(fallback.inherit.as_deref(), Some("base"));
    }

    #[test]
    fn test_unknown_preset_uses_file_defaults() {
        let file = PresetFile::from_json(SAMPLE).unwrap();
        let resolved = file.overrides_for("nobody", None).unwrap();
        assert_eq!(resolved, file.file_overrides());
    }

    #[test]
    fn test_inheritance_cycle_is_rejected() {
        let file = PresetFile::from_json(
            r#"{"models": [
                {"name": "a", "inherit": "b"},
                {"name": "b", "inherit": "a"}
            ]}"#,
        )
        .unwrap();
        let err = file.overrides_for("a", None).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_dangling_inherit_is_rejected() {
        let file = PresetFile::from_json(r#"{"models": [{"name": "a", "inherit": "ghost"}]}"#)
            .unwrap();
        let err = file.overrides_for("a", None).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(PresetFile::from_json(r#"{"modles": []}"#).is_err());
    }
}
