//! Core library for tag-driven video trimming.
//!
//! A source video is sampled periodically, every frame is run through an
//! external detector, and the timestamps whose labels satisfy the wanted and
//! unwanted tags are turned into keep-intervals by [`segments::build_intervals`].
//! The intervals are then cut out of the source with ffmpeg (stream copy) and
//! concatenated into one output file.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use scenesift_core::config::CoreConfigBuilder;
//! use scenesift_core::external::{CommandClassifier, CrateFfprobeExecutor, SidecarSpawner};
//! use scenesift_core::process_videos;
//! use std::path::PathBuf;
//!
//! let config = CoreConfigBuilder::new()
//!     .sample_interval(10.0)
//!     .jobs(4)
//!     .build()
//!     .unwrap();
//!
//! let classifier = CommandClassifier::from_config(&config.detector);
//! let results = process_videos(
//!     &SidecarSpawner,
//!     &CrateFfprobeExecutor::new(),
//!     &classifier,
//!     &config,
//!     &[PathBuf::from("/videos/show.mp4")],
//! )
//! .unwrap();
//! println!("{:?}", results[0].outcome);
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod external;
pub mod processing;
pub mod segments;
pub mod tags;
pub mod terminal;
pub mod utils;
pub mod workspace;

// Re-exports for public API
pub use checkpoint::Stage;
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use processing::{OutputPaths, ProcessResult, RunOutcome, process_video, process_videos};
pub use segments::{CutPlan, Interval, Inversion, SegmentParams, build_intervals, invert_intervals};
pub use utils::format_duration;
pub use workspace::cleanup_registered_workspaces;
