//! Core video processing logic and orchestration.
//!
//! The trimming pipeline is split into one submodule per external stage;
//! [`pipeline`] sequences them and owns checkpointing and outputs.

/// Periodic keyframe sampling with ffmpeg
pub mod sampling;

/// Frame classification and match selection
pub mod classification;

/// Stream-copy cutting and concatenation
pub mod extract;

/// Stage sequencing, checkpoints and output artifacts
pub mod pipeline;

pub use pipeline::{OutputPaths, ProcessResult, RunOutcome, process_video, process_videos};
