//! FFprobe integration for reading the container duration of a source video.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Trait for media probing.
pub trait FfprobeExecutor: Sync {
    /// Container duration in seconds.
    fn get_duration(&self, input_path: &Path) -> CoreResult<f64>;
}

/// Implementation backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_duration(&self, input_path: &Path) -> CoreResult<f64> {
        get_duration(input_path)
    }
}

/// Gets the container duration of a file via ffprobe.
pub fn get_duration(input_path: &Path) -> CoreResult<f64> {
    log::debug!(
        "Running ffprobe (via crate) for duration on: {}",
        input_path.display()
    );
    let metadata = ffprobe(input_path).map_err(|err| {
        log::error!("ffprobe failed for {}: {:?}", input_path.display(), err);
        map_ffprobe_error(err, "duration")
    })?;

    let duration = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Failed to parse duration from format for {}",
                input_path.display()
            ))
        })?;

    log::debug!("Duration of {}: {duration:.3}s", input_path.display());
    Ok(duration)
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => CoreError::JsonParseError(format!(
            "ffprobe {context} output deserialization: {err}"
        )),
        _ => CoreError::FfprobeParse(format!(
            "Unknown ffprobe error during {context}: {err:?}"
        )),
    }
}
