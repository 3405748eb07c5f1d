//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// The `segments` command: interval building over a matches file.
pub mod segments;

/// The `tags` command: prints the tag vocabulary.
pub mod tags;

/// The `trim` command: runs the full pipeline over video files.
pub mod trim;
