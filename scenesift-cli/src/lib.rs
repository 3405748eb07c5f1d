// scenesift-cli/src/lib.rs
//
// Library portion of the scenesift CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, SegmentsArgs, TrimArgs};
pub use commands::segments::run_segments;
pub use commands::tags::run_tags;
pub use commands::trim::{TrimSummary, run_trim};
pub use error::{CliErrorContext, CliResult};
