// ============================================================================
// scenesift-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Layers are applied in order of
// precedence by the caller: built-in defaults (new), preset values
// (apply_overrides), then explicit setters for command-line flags. build()
// validates the result.

use std::path::PathBuf;

use super::{CoreConfig, PresetOverrides};
use crate::checkpoint::Stage;
use crate::error::CoreResult;
use crate::tags::{Tag, TagSelection, parse_tag_list};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use scenesift_core::config::CoreConfigBuilder;
/// use scenesift_core::tags::TagSelection;
///
/// let config = CoreConfigBuilder::new()
///     .sample_interval(10.0)
///     .gap_threshold(45.0)
///     .wanted(TagSelection::parse_wanted("EXPOSED_BELLY,FACE_F").unwrap())
///     .jobs(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.output_tag(), "scenesift-i10-c45-d20-e5");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies resolved preset values. Tag lists are validated here.
    ///
    /// # Errors
    ///
    /// * If a tag list in the preset names an unknown tag
    pub fn apply_overrides(mut self, overrides: PresetOverrides) -> CoreResult<Self> {
        let c = &mut self.config;
        if let Some(v) = overrides.sample_interval {
            c.sample_interval = v;
        }
        if let Some(v) = overrides.gap_threshold {
            c.gap_threshold = v;
        }
        if let Some(v) = overrides.min_duration {
            c.min_duration = v;
        }
        if let Some(v) = overrides.extension {
            c.extension = v;
        }
        if let Some(v) = overrides.skip_begin {
            c.skip_begin = v;
        }
        if let Some(v) = overrides.skip_finish {
            c.skip_finish = v;
        }
        if let Some(list) = overrides.wanted.as_deref() {
            c.wanted = TagSelection::parse_wanted(list)?;
        }
        if let Some(list) = overrides.unwanted.as_deref() {
            c.unwanted = parse_tag_list(list)?;
        }
        if let Some(ext) = overrides.video_ext {
            c.video_ext = ext;
        }
        Ok(self)
    }

    /// Sets the seconds between sampled frames.
    ///
    /// # Arguments
    ///
    /// * `seconds` - Sampling step, must be positive
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn sample_interval(mut self, seconds: f64) -> Self {
        self.config.sample_interval = seconds;
        self
    }

    /// Sets the longest silence tolerated inside one kept run.
    pub fn gap_threshold(mut self, seconds: f64) -> Self {
        self.config.gap_threshold = seconds;
        self
    }

    /// Sets the shortest run worth keeping.
    pub fn min_duration(mut self, seconds: f64) -> Self {
        self.config.min_duration = seconds;
        self
    }

    /// Sets the padding added on both sides of a run.
    pub fn extension(mut self, seconds: f64) -> Self {
        self.config.extension = seconds;
        self
    }

    pub fn keyframe_slack(mut self, seconds: f64) -> Self {
        self.config.keyframe_slack = seconds;
        self
    }

    /// Sets the seconds skipped at the beginning of the video.
    pub fn skip_begin(mut self, seconds: f64) -> Self {
        self.config.skip_begin = seconds;
        self
    }

    /// Sets the seconds skipped at the end of the video.
    ///
    /// A value below one second adds a terminal sample one second before the
    /// end of the stream.
    pub fn skip_finish(mut self, seconds: f64) -> Self {
        self.config.skip_finish = seconds;
        self
    }

    pub fn sample_width(mut self, width: u32) -> Self {
        self.config.sample_width = width;
        self
    }

    /// Sets the wanted tags.
    ///
    /// # Arguments
    ///
    /// * `selection` - Parsed wanted list, possibly the `NONE` sentinel
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn wanted(mut self, selection: TagSelection) -> Self {
        self.config.wanted = selection;
        self
    }

    pub fn unwanted(mut self, tags: Vec<Tag>) -> Self {
        self.config.unwanted = tags;
        self
    }

    /// Sets the detector executable.
    pub fn detector_program(mut self, program: impl Into<String>) -> Self {
        self.config.detector.program = program.into();
        self
    }

    /// Sets extra detector arguments placed before the image path.
    pub fn detector_args(mut self, args: Vec<String>) -> Self {
        self.config.detector.args = args;
        self
    }

    pub fn min_score(mut self, score: f32) -> Self {
        self.config.detector.min_score = Some(score);
        self
    }

    pub fn video_ext(mut self, ext: impl Into<String>) -> Self {
        self.config.video_ext = ext.into();
        self
    }

    /// Sets the output directory.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory for trimmed outputs and notes
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output_dir = Some(dir);
        self
    }

    /// Sets the parent directory of per-video working directories.
    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.temp_dir = Some(dir);
        self
    }

    pub fn keep_workspace(mut self, keep: bool) -> Self {
        self.config.keep_workspace = keep;
        self
    }

    pub fn inverse(mut self, enable: bool) -> Self {
        self.config.inverse = enable;
        self
    }

    pub fn write_note(mut self, enable: bool) -> Self {
        self.config.write_note = enable;
        self
    }

    /// Sets the first stage to run; earlier stages are read from checkpoints.
    pub fn resume_from(mut self, stage: Stage) -> Self {
        self.config.resume_from = stage;
        self
    }

    /// Sets the number of parallel workers.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// * If any numeric setting is out of range
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
