// scenesift-cli/src/config.rs
//
// Locating the preset file and turning CLI flags into a `CoreConfig`.
//
// Precedence, lowest first: built-in defaults, the preset file's top-level
// values, the resolved preset chain, explicit CLI flags.

use crate::cli::{IntervalArgs, TrimArgs};
use crate::error::CliResult;

use scenesift_core::config::PresetFile;
use scenesift_core::tags::{TagSelection, parse_tag_list};
use scenesift_core::{CoreConfig, CoreConfigBuilder};

use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Name of the preset file looked up beside the executable.
pub const PRESET_FILE_NAME: &str = "scenesift.json";

/// The preset file to use: an explicit path (`--config` or SCENESIFT_CONFIG),
/// else `scenesift.json` beside the executable if it exists.
pub fn preset_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let exe = std::env::current_exe().ok()?;
    let beside = exe.parent()?.join(PRESET_FILE_NAME);
    beside.is_file().then_some(beside)
}

/// Applies the interval-shaping flags shared by `trim` and `segments`.
pub fn apply_interval_args(mut builder: CoreConfigBuilder, args: &IntervalArgs) -> CoreConfigBuilder {
    if let Some(v) = args.cut {
        builder = builder.gap_threshold(v);
    }
    if let Some(v) = args.duration {
        builder = builder.min_duration(v);
    }
    if let Some(v) = args.extension {
        builder = builder.extension(v);
    }
    if let Some(v) = args.keyframe_slack {
        builder = builder.keyframe_slack(v);
    }
    builder
}

/// Builds the run configuration for `scenesift trim`.
///
/// # Errors
///
/// * If the preset file cannot be read or parsed
/// * If a preset's inheritance chain is broken
/// * If any tag is outside the detector vocabulary
/// * If a numeric setting is out of range
pub fn build_trim_config(args: &TrimArgs) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new();

    match preset_file_path(args.config.as_deref()) {
        Some(path) => {
            debug!("Using preset file {}", path.display());
            let presets = PresetFile::load(&path)?;
            let overrides = match args.model.as_deref() {
                Some(model) => presets.overrides_for(model, args.site.as_deref())?,
                None => presets.file_overrides(),
            };
            builder = builder.apply_overrides(overrides)?;
        }
        None => {
            if let Some(model) = args.model.as_deref() {
                warn!("No preset file found; ignoring preset '{model}'");
            }
        }
    }

    if let Some(v) = args.interval {
        builder = builder.sample_interval(v);
    }
    builder = apply_interval_args(builder, &args.intervals);
    if let Some(v) = args.begin {
        builder = builder.skip_begin(v);
    }
    if let Some(v) = args.finish {
        builder = builder.skip_finish(v);
    }
    if let Some(list) = args.tags.as_deref() {
        builder = builder.wanted(TagSelection::parse_wanted(list)?);
    }
    if let Some(list) = args.unwanted.as_deref() {
        builder = builder.unwanted(parse_tag_list(list)?);
    }
    if let Some(program) = args.detector.as_deref() {
        builder = builder.detector_program(program);
    }
    if !args.detector_args.is_empty() {
        builder = builder.detector_args(args.detector_args.clone());
    }
    if let Some(score) = args.min_score {
        builder = builder.min_score(score);
    }
    if let Some(dir) = args.output_dir.clone() {
        builder = builder.output_dir(dir);
    }
    if let Some(dir) = args.temp_dir.clone() {
        builder = builder.temp_dir(dir);
    }
    if let Some(stage) = args.from_stage {
        builder = builder.resume_from(stage);
    }
    if let Some(jobs) = args.jobs {
        builder = builder.jobs(jobs);
    }

    builder
        .keep_workspace(args.keep)
        .inverse(args.inverse)
        .write_note(args.note)
        .build()
}
