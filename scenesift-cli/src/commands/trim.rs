//! Implementation of the 'trim' subcommand.
//!
//! Builds the run configuration, attaches the run log, checks the external
//! programs and hands the files to `scenesift_core::process_videos`.

use crate::cli::TrimArgs;
use crate::config::build_trim_config;
use crate::error::{CliErrorContext, CliResult};
use crate::logging;

use scenesift_core::external::{
    CommandClassifier, CrateFfprobeExecutor, SidecarSpawner, check_all_dependencies,
};
use scenesift_core::tags::join_tags;
use scenesift_core::utils::parent_dir;
use scenesift_core::{
    CoreConfig, CoreError, ProcessResult, RunOutcome, format_duration, terminal,
};

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Counts of how the videos of one run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimSummary {
    pub trimmed: usize,
    pub untouched: usize,
    pub failed: usize,
}

impl TrimSummary {
    pub fn from_results(results: &[ProcessResult]) -> Self {
        results
            .iter()
            .fold(TrimSummary::default(), |mut summary, result| {
                match result.outcome {
                    RunOutcome::Trimmed { .. } => summary.trimmed += 1,
                    RunOutcome::Failed(_) => summary.failed += 1,
                    _ => summary.untouched += 1,
                }
                summary
            })
    }
}

/// Every input must be an existing file.
pub fn check_inputs(files: &[PathBuf]) -> CliResult<()> {
    match files.iter().find(|file| !file.is_file()) {
        Some(missing) => Err(CoreError::PathError(format!(
            "Invalid input path '{}': not an existing file",
            missing.display()
        ))),
        None => Ok(()),
    }
}

/// `--log-dir`, else `<output dir>/logs`, else `logs` beside the first video.
pub fn log_dir_for(args: &TrimArgs, config: &CoreConfig) -> PathBuf {
    if let Some(dir) = &args.log_dir {
        return dir.clone();
    }
    let base = match (&config.output_dir, args.files.first()) {
        (Some(dir), _) => dir.clone(),
        (None, Some(first)) => parent_dir(first).to_path_buf(),
        (None, None) => PathBuf::from("."),
    };
    base.join("logs")
}

fn display_initialization_info(args: &TrimArgs, config: &CoreConfig, log_path: &Path) {
    terminal::print_section("Initialization");
    terminal::print_status("Videos", &args.files.len().to_string(), false);
    let output = config
        .output_dir
        .as_ref()
        .map_or_else(|| "beside each video".to_string(), |dir| dir.display().to_string());
    terminal::print_status("Output", &output, false);
    terminal::print_status("Log file", &log_path.display().to_string(), false);
    terminal::print_status("Wanted", &config.wanted.to_string(), true);
    if !config.unwanted.is_empty() {
        terminal::print_status("Unwanted", &join_tags(&config.unwanted), false);
    }
    terminal::print_status(
        "Sampling",
        &format!("every {}s from {}s", config.sample_interval, config.skip_begin),
        false,
    );
    terminal::print_status(
        "Segments",
        &format!(
            "cut {}s, minimum {}s, extension {}s",
            config.gap_threshold, config.min_duration, config.extension
        ),
        false,
    );
    terminal::print_status("Detector", &config.detector.program, false);
    if config.resume_from > scenesift_core::Stage::Sample {
        terminal::print_status("Resume at", config.resume_from.as_str(), true);
    }
}

fn display_results(results: &[ProcessResult], started: Instant) -> TrimSummary {
    terminal::print_section("Results");
    for result in results {
        let name = result
            .source
            .file_name()
            .map_or_else(|| result.source.display().to_string(), |n| n.to_string_lossy().into_owned());
        terminal::print_processing(&name);
        let outcome = match &result.outcome {
            RunOutcome::Disabled => "skipped (no wanted tags)".to_string(),
            RunOutcome::OutputExists(path) => format!("skipped ({} exists)", path.display()),
            RunOutcome::NoMatches => "no matching segment".to_string(),
            RunOutcome::WholeStream => "whole video matched".to_string(),
            RunOutcome::Trimmed {
                output, intervals, ..
            } => format!("{} segment(s) -> {}", intervals.len(), output.display()),
            RunOutcome::Failed(message) => format!("failed: {message}"),
        };
        terminal::print_status("Outcome", &outcome, false);
        terminal::print_status("Time", &format_duration(result.elapsed.as_secs_f64()), false);
    }

    let summary = TrimSummary::from_results(results);
    if summary.failed == 0 {
        terminal::print_success(&format!(
            "{} trimmed, {} left as is",
            summary.trimmed, summary.untouched
        ));
    } else {
        terminal::print_error(
            "Some videos failed",
            &format!(
                "{} trimmed, {} left as is, {} failed",
                summary.trimmed, summary.untouched, summary.failed
            ),
            Some("Rerun with -k and --from-stage to resume from the last checkpoint"),
        );
    }
    terminal::print_status(
        "Total time",
        &format_duration(started.elapsed().as_secs_f64()),
        true,
    );
    summary
}

/// Runs the trim pipeline for every file named on the command line.
pub fn run_trim(args: TrimArgs) -> CliResult<TrimSummary> {
    let started = Instant::now();
    let config = build_trim_config(&args)?;

    if config.wanted.is_nothing() {
        terminal::print_warning("Wanted tags are NONE; nothing to do");
        return Ok(TrimSummary {
            untouched: args.files.len(),
            ..TrimSummary::default()
        });
    }

    check_inputs(&args.files)?;

    let log_dir = log_dir_for(&args, &config);
    fs::create_dir_all(&log_dir)
        .cli_with_context(|| format!("Failed to create log directory '{}'", log_dir.display()))?;
    let log_path = logging::run_log_path(&log_dir);
    logging::attach_log_file(&log_path)?;

    display_initialization_info(&args, &config, &log_path);
    debug!("Run started: {}", chrono::Local::now());
    debug!("Configuration: {config:?}");

    check_all_dependencies(&config.detector.program)?;

    let classifier = CommandClassifier::from_config(&config.detector);
    let results = scenesift_core::process_videos(
        &SidecarSpawner,
        &CrateFfprobeExecutor::new(),
        &classifier,
        &config,
        &args.files,
    )?;

    let summary = display_results(&results, started);
    debug!("Finished at: {}", chrono::Local::now());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use scenesift_core::Interval;
    use std::time::Duration;

    fn trim_args(argv: &[&str]) -> TrimArgs {
        let mut full = vec!["scenesift", "trim"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Trim(args) => args,
            other => panic!("expected trim, got {other:?}"),
        }
    }

    fn result(outcome: RunOutcome) -> ProcessResult {
        ProcessResult {
            source: PathBuf::from("/videos/show.mp4"),
            outcome,
            elapsed: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let results = vec![
            result(RunOutcome::Trimmed {
                output: PathBuf::from("/videos/out.mp4"),
                inverse_output: None,
                intervals: vec![Interval::new(0.0, 10.0)],
            }),
            result(RunOutcome::NoMatches),
            result(RunOutcome::WholeStream),
            result(RunOutcome::Failed("ffmpeg exploded".into())),
        ];
        assert_eq!(
            TrimSummary::from_results(&results),
            TrimSummary {
                trimmed: 1,
                untouched: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.mp4");
        fs::write(&present, b"video").unwrap();

        assert!(check_inputs(&[present.clone()]).is_ok());
        let err = check_inputs(&[present, dir.path().join("b.mp4")]).unwrap_err();
        assert!(err.to_string().contains("b.mp4"));
    }

    #[test]
    fn test_log_dir_defaults() {
        let config = CoreConfig::default();
        let args = trim_args(&["/videos/a.mp4"]);
        assert_eq!(log_dir_for(&args, &config), PathBuf::from("/videos/logs"));

        let args = trim_args(&["/videos/a.mp4", "-l", "/var/log/scenesift"]);
        assert_eq!(log_dir_for(&args, &config), PathBuf::from("/var/log/scenesift"));

        let config = CoreConfig {
            output_dir: Some(PathBuf::from("/out")),
            ..CoreConfig::default()
        };
        let args = trim_args(&["/videos/a.mp4"]);
        assert_eq!(log_dir_for(&args, &config), PathBuf::from("/out/logs"));
    }
}
