//! Implementation of the 'tags' subcommand.

use scenesift_core::tags::{DETECTOR_LABELS, NONE_SENTINEL, TAG_FAMILIES};
use scenesift_core::terminal;

/// Labels belonging to a family name, e.g. `FACE` -> `FACE_F, FACE_M`.
pub fn family_members(family: &str) -> Vec<&'static str> {
    DETECTOR_LABELS
        .iter()
        .copied()
        .filter(|label| {
            label
                .strip_prefix(family)
                .is_some_and(|rest| rest.starts_with('_'))
        })
        .collect()
}

/// Prints every tag accepted by `--tags`, `--unwanted` and preset files.
pub fn run_tags() {
    terminal::print_section("Detector labels");
    for label in DETECTOR_LABELS {
        terminal::print_sub_item(label);
    }

    terminal::print_section("Tag families");
    for family in TAG_FAMILIES {
        terminal::print_sub_item(&format!("{family} ({})", family_members(family).join(", ")));
    }

    terminal::print_section("Special values");
    terminal::print_sub_item(&format!(
        "{NONE_SENTINEL} (as the first wanted tag: skip processing entirely)"
    ));
}
