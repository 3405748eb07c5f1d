//! Error types for the scenesift-core library.
//!
//! Every fallible operation in the crate returns [`CoreResult`]. The interval
//! builder and inverter never return errors; they panic on precondition
//! violations.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for scenesift-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, io::Error),

    #[error("Command '{0}' failed with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Required dependency '{0}' not found or not executable")]
    DependencyNotFound(String),

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Checkpoint '{0}' is missing or malformed: {1}")]
    Checkpoint(String, String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for scenesift-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a [`CoreError::CommandWait`] for a command whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

/// Shorthand for configuration errors raised while validating user input.
pub(crate) fn config_error(message: impl Into<String>) -> CoreError {
    CoreError::Config(message.into())
}
