// scenesift-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use scenesift_core::Stage;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Scenesift: tag-driven video trimming",
    long_about = "Samples frames from videos, classifies them with an external detector \
                  and keeps only the stretches whose labels match the wanted tags."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trims videos down to the parts matching the wanted tags
    Trim(TrimArgs),
    /// Prints the tag vocabulary understood by the detector
    Tags,
    /// Builds intervals from a matches file without touching any video
    Segments(SegmentsArgs),
}

/// Options shared by `trim` and `segments` that shape the intervals.
#[derive(Args, Debug, Clone, Default)]
pub struct IntervalArgs {
    /// Longest gap (seconds) between matches inside one segment
    #[arg(short = 'c', long = "cut", value_name = "SECS")]
    pub cut: Option<f64>,

    /// Shortest segment (seconds) worth keeping
    #[arg(short = 'd', long = "duration", value_name = "SECS")]
    pub duration: Option<f64>,

    /// Seconds added before and after every segment
    #[arg(short = 'e', long = "extension", value_name = "SECS")]
    pub extension: Option<f64>,

    /// Per-side margin for the cutter snapping to keyframes
    #[arg(long, value_name = "SECS")]
    pub keyframe_slack: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct TrimArgs {
    /// Video files to trim
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Seconds between sampled frames
    #[arg(short = 'i', long = "interval", value_name = "SECS")]
    pub interval: Option<f64>,

    #[command(flatten)]
    pub intervals: IntervalArgs,

    /// Seconds skipped at the start of each video
    #[arg(short = 'b', long = "begin", value_name = "SECS")]
    pub begin: Option<f64>,

    /// Seconds skipped at the end of each video
    #[arg(short = 'f', long = "finish", value_name = "SECS")]
    pub finish: Option<f64>,

    /// Preset (model) name to load from the preset file
    #[arg(short = 'm', long = "model", value_name = "NAME")]
    pub model: Option<String>,

    /// Site that disambiguates presets sharing a name
    #[arg(short = 's', long = "site", value_name = "SITE", requires = "model")]
    pub site: Option<String>,

    /// Keep the working directory with its frames and checkpoints
    #[arg(short = 'k', long = "keep")]
    pub keep: bool,

    /// Print debug output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Preset file (JSON)
    #[arg(long, value_name = "PATH", env = "SCENESIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for trimmed videos (defaults to each video's directory)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for log files (defaults to OUTPUT_DIR/logs)
    #[arg(short = 'l', long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Parent directory for working directories (defaults to each video's directory)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Also write the discarded material to an -inverse file
    #[arg(long)]
    pub inverse: bool,

    /// Write a note explaining why no video was produced
    #[arg(long)]
    pub note: bool,

    /// Resume at this stage, loading earlier results from the working directory
    #[arg(long, value_name = "STAGE")]
    pub from_stage: Option<Stage>,

    /// Parallel workers for sampling, classification and extraction
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub jobs: Option<usize>,

    /// Detector program that classifies a single image
    #[arg(long, value_name = "PROGRAM", env = "SCENESIFT_DETECTOR")]
    pub detector: Option<String>,

    /// Extra argument passed to the detector (repeatable)
    #[arg(long = "detector-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub detector_args: Vec<String>,

    /// Ignore detections scoring below this value
    #[arg(long, value_name = "SCORE")]
    pub min_score: Option<f32>,

    /// Comma-separated wanted tags, or NONE to skip processing
    #[arg(short = 't', long, value_name = "LIST")]
    pub tags: Option<String>,

    /// Comma-separated tags that veto a match
    #[arg(short = 'u', long, value_name = "LIST")]
    pub unwanted: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SegmentsArgs {
    /// Matches file (`<timestamp> <image> <LABEL>...` per line)
    #[arg(value_name = "MATCHES_FILE")]
    pub matches_file: PathBuf,

    /// Length of the video in seconds
    #[arg(long = "length", value_name = "SECS")]
    pub length: f64,

    #[command(flatten)]
    pub intervals: IntervalArgs,

    /// Also print the intervals between the kept segments
    #[arg(long)]
    pub inverse: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_trim_basic_args() {
        let cli = Cli::parse_from(["scenesift", "trim", "a.mp4", "b.mp4"]);
        match cli.command {
            Commands::Trim(args) => {
                assert_eq!(args.files, vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
                assert!(args.intervals.cut.is_none());
                assert!(args.model.is_none());
                assert!(!args.keep);
                assert!(args.from_stage.is_none());
            }
            other => panic!("expected trim, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_trim_short_flags() {
        let cli = Cli::parse_from([
            "scenesift", "trim", "a.mp4", "-i", "10", "-c", "40", "-d", "15", "-e", "3", "-b", "2",
            "-f", "5", "-m", "alice", "-s", "example", "-k", "-v",
        ]);
        match cli.command {
            Commands::Trim(args) => {
                assert_eq!(args.interval, Some(10.0));
                assert_eq!(args.intervals.cut, Some(40.0));
                assert_eq!(args.intervals.duration, Some(15.0));
                assert_eq!(args.intervals.extension, Some(3.0));
                assert_eq!(args.begin, Some(2.0));
                assert_eq!(args.finish, Some(5.0));
                assert_eq!(args.model.as_deref(), Some("alice"));
                assert_eq!(args.site.as_deref(), Some("example"));
                assert!(args.keep);
                assert!(args.verbose);
            }
            other => panic!("expected trim, got {other:?}"),
        }
    }

    #[test]
    fn test_site_requires_model() {
        let err = Cli::try_parse_from(["scenesift", "trim", "a.mp4", "-s", "example"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_from_stage_is_parsed() {
        let cli = Cli::parse_from(["scenesift", "trim", "a.mp4", "--from-stage", "segment"]);
        match cli.command {
            Commands::Trim(args) => assert_eq!(args.from_stage, Some(Stage::Segment)),
            other => panic!("expected trim, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["scenesift", "trim", "a.mp4", "--from-stage", "encode"]).is_err());
    }

    #[test]
    fn test_parse_segments() {
        let cli = Cli::parse_from([
            "scenesift", "segments", "matches.txt", "--length", "600", "-c", "30", "--inverse",
        ]);
        match cli.command {
            Commands::Segments(args) => {
                assert_eq!(args.matches_file, PathBuf::from("matches.txt"));
                assert_eq!(args.length, 600.0);
                assert_eq!(args.intervals.cut, Some(30.0));
                assert!(args.inverse);
            }
            other => panic!("expected segments, got {other:?}"),
        }
    }
}
