//! Configuration structures and constants for the scenesift-core library.
//!
//! [`CoreConfig`] is the single flattened record the pipeline runs on. It is
//! produced by [`CoreConfigBuilder`], optionally fed by a JSON preset file
//! (see [`presets`]), and validated before any external process is started.

mod builder;
pub mod presets;

use std::path::PathBuf;

use crate::checkpoint::Stage;
use crate::error::{CoreResult, config_error};
use crate::segments::SegmentParams;
use crate::tags::{Tag, TagMatcher, TagSelection};

pub use builder::CoreConfigBuilder;
pub use presets::{Preset, PresetFile, PresetOverrides};

// Default constants

/// Default seconds between two sampled frames.
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 20.0;

/// Default longest silence (seconds) tolerated inside one kept run.
pub const DEFAULT_GAP_THRESHOLD: f64 = 30.0;

/// Default minimum length (seconds) of a kept run.
pub const DEFAULT_MIN_DURATION: f64 = 20.0;

/// Default padding (seconds) added on both sides of a kept run.
pub const DEFAULT_EXTENSION: f64 = 5.0;

/// Default per-side margin (seconds) for stream-copy cuts snapping to keyframes.
pub const DEFAULT_KEYFRAME_SLACK: f64 = 0.5;

/// Default seconds skipped at the beginning of the video.
pub const DEFAULT_SKIP_BEGIN: f64 = 1.0;

/// Default seconds skipped at the end of the video.
pub const DEFAULT_SKIP_FINISH: f64 = 0.0;

/// Default wanted tags when neither a preset nor the command line sets any.
pub const DEFAULT_WANTED_TAGS: &str =
    "EXPOSED_BREAST,EXPOSED_BUTTOCKS,EXPOSED_ANUS,EXPOSED_GENITALIA,EXPOSED_BELLY";

/// Default container extension for clips and the final output.
pub const DEFAULT_VIDEO_EXT: &str = "mp4";

/// Default width (pixels) sampled frames are scaled to before classification.
pub const DEFAULT_SAMPLE_WIDTH: u32 = 800;

/// Default detector executable; it receives the image path as last argument.
pub const DEFAULT_DETECTOR_PROGRAM: &str = "scenesift-detect";

/// External detector invocation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Program to run for every sampled frame
    pub program: String,

    /// Extra arguments placed before the image path (e.g. a higher-recall mode)
    pub args: Vec<String>,

    /// Detections scoring below this are ignored
    pub min_score: Option<f32>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_DETECTOR_PROGRAM.to_string(),
            args: Vec::new(),
            min_score: None,
        }
    }
}

/// Main configuration structure for the scenesift-core library.
///
/// All durations are in seconds. Build instances with [`CoreConfigBuilder`];
/// `Default` gives the same values the builder starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    // ---- Sampling ----

    /// Seconds between sampled frames
    pub sample_interval: f64,

    /// Seconds excluded from sampling at the start
    pub skip_begin: f64,

    /// Seconds excluded from the usable duration at the end
    pub skip_finish: f64,

    /// Width sampled frames are scaled to
    pub sample_width: u32,

    // ---- Interval inference ----

    /// Longest silence tolerated before splitting two runs
    pub gap_threshold: f64,

    /// Shortest run worth keeping
    pub min_duration: f64,

    /// Padding added on both sides of each run
    pub extension: f64,

    /// Per-side margin for keyframe snapping of the cutter
    pub keyframe_slack: f64,

    // ---- Tag matching ----

    /// Tags a sample needs (any of them) to count as a match
    pub wanted: TagSelection,

    /// Tags that veto a match
    pub unwanted: Vec<Tag>,

    /// External detector settings
    pub detector: DetectorConfig,

    // ---- Output ----

    /// Container extension of clips and outputs
    pub video_ext: String,

    /// Output directory (defaults to the directory of each source video)
    pub output_dir: Option<PathBuf>,

    /// Also produce the inverse compilation of discarded material
    pub inverse: bool,

    /// Write an explanatory text file when no video is produced
    pub write_note: bool,

    // ---- Working directory and execution ----

    /// Parent of per-video working directories (defaults to the source directory)
    pub temp_dir: Option<PathBuf>,

    /// Keep the working directory after the run
    pub keep_workspace: bool,

    /// First stage to execute; earlier stages are loaded from checkpoints
    pub resume_from: Stage,

    /// Parallel workers for classification and extraction
    pub jobs: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            skip_begin: DEFAULT_SKIP_BEGIN,
            skip_finish: DEFAULT_SKIP_FINISH,
            sample_width: DEFAULT_SAMPLE_WIDTH,
            gap_threshold: DEFAULT_GAP_THRESHOLD,
            min_duration: DEFAULT_MIN_DURATION,
            extension: DEFAULT_EXTENSION,
            keyframe_slack: DEFAULT_KEYFRAME_SLACK,
            wanted: TagSelection::parse_wanted(DEFAULT_WANTED_TAGS)
                .unwrap_or(TagSelection::Nothing),
            unwanted: Vec::new(),
            detector: DetectorConfig::default(),
            video_ext: DEFAULT_VIDEO_EXT.to_string(),
            output_dir: None,
            inverse: false,
            write_note: false,
            temp_dir: None,
            keep_workspace: false,
            resume_from: Stage::Sample,
            jobs: 1,
        }
    }
}

impl CoreConfig {
    /// Checks numeric ranges and string fields.
    ///
    /// Tags are validated earlier, when they are parsed.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.sample_interval.is_finite() && self.sample_interval > 0.0) {
            return Err(config_error(format!(
                "sample interval must be greater than 0, got {}",
                self.sample_interval
            )));
        }

        for (name, value) in [
            ("gap threshold", self.gap_threshold),
            ("minimum duration", self.min_duration),
            ("extension", self.extension),
            ("keyframe slack", self.keyframe_slack),
            ("skip begin", self.skip_begin),
            ("skip finish", self.skip_finish),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(config_error(format!(
                    "{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }

        if self.sample_width == 0 {
            return Err(config_error("sample width must be greater than 0"));
        }

        if self.jobs == 0 {
            return Err(config_error("jobs must be at least 1"));
        }

        if self.video_ext.is_empty() || !self.video_ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(config_error(format!(
                "video extension must be alphanumeric, got '{}'",
                self.video_ext
            )));
        }

        if self.detector.program.trim().is_empty() {
            return Err(config_error("detector program must not be empty"));
        }

        if let Some(score) = self.detector.min_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(config_error(format!(
                    "minimum detector score must be between 0 and 1, got {score}"
                )));
            }
        }

        Ok(())
    }

    /// The tag matcher, or `None` when the wanted list is the `NONE` sentinel.
    #[must_use]
    pub fn matcher(&self) -> Option<TagMatcher> {
        match &self.wanted {
            TagSelection::Nothing => None,
            TagSelection::Tags(tags) => Some(TagMatcher::new(tags.clone(), self.unwanted.clone())),
        }
    }

    /// Interval builder parameters for a stream with the given usable duration.
    #[must_use]
    pub fn segment_params(&self, duration: f64) -> SegmentParams {
        SegmentParams {
            extension: self.extension,
            gap_threshold: self.gap_threshold,
            min_duration: self.min_duration,
            keyframe_slack: self.keyframe_slack,
            duration: duration.max(0.0),
        }
    }

    /// Settings tag appended to output file names, e.g. `scenesift-i20-c30-d20-e5`.
    #[must_use]
    pub fn output_tag(&self) -> String {
        format!(
            "scenesift-i{}-c{}-d{}-e{}",
            self.sample_interval, self.gap_threshold, self.min_duration, self.extension
        )
    }
}
