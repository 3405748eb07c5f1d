// ============================================================================
// scenesift-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// ffmpeg (frame sampling, cutting, concatenation), ffprobe (duration) and
// the detector program are all reached through traits defined here, so the
// pipeline can be driven by the mocks in tests.

use crate::error::{CoreError, CoreResult};

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// The external image detector
pub mod classifier;

/// Scripted stand-ins for ffmpeg, ffprobe and the detector
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use classifier::{Classifier, CommandClassifier, Detection};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_ffmpeg};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs the command with `-version`, which both ffmpeg and ffprobe accept.
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency directly: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Resolves a program the way the shell would, without running it.
///
/// Detector programs need not understand `-version`, so they are located on
/// `PATH` (or checked directly when given as a path) instead of executed.
pub fn locate_program(program: &str) -> CoreResult<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return if candidate.is_file() {
            Ok(candidate.to_path_buf())
        } else {
            Err(CoreError::DependencyNotFound(program.to_string()))
        };
    }

    env::var_os("PATH")
        .into_iter()
        .flat_map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
        .map(|path| {
            log::debug!("Found detector at {}", path.display());
            path
        })
        .ok_or_else(|| {
            log::warn!("Dependency '{program}' not found on PATH.");
            CoreError::DependencyNotFound(program.to_string())
        })
}

/// Verifies every external program a trimming run needs.
pub fn check_all_dependencies(detector_program: &str) -> CoreResult<()> {
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;
    locate_program(detector_program)?;
    Ok(())
}
