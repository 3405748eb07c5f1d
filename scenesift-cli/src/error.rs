// ============================================================================
// scenesift-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type and only adds context to it, so every
// failure reaching `main` is a `CoreError` with a readable message.

use scenesift_core::{CoreError, CoreResult};

use std::fmt;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{context}: {core_error}"))
        })
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {core_error}", f()))
        })
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::OperationFailed(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}

/// Creates a CLI error with a formatted message.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        ::scenesift_core::CoreError::OperationFailed(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_result_context_wraps_the_message() {
        let result: Result<(), io::Error> = Err(io::Error::other("disk full"));
        let err = result.cli_context("Writing log file").unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(ref msg) if msg.starts_with("Writing log file: ")));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_option_context_becomes_the_message() {
        let value: Option<u8> = None;
        let err = value.cli_with_context(|| format!("missing {}", "value")).unwrap_err();
        assert_eq!(err.to_string(), CoreError::OperationFailed("missing value".into()).to_string());
    }

    #[test]
    fn test_cli_error_macro() {
        let err = cli_error!("{} failed", "trim");
        assert!(matches!(err, CoreError::OperationFailed(ref msg) if msg == "trim failed"));
    }
}
