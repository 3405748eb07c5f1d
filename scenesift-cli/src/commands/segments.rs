//! Implementation of the 'segments' subcommand.
//!
//! Runs the interval builder (and optionally the inverter) over a matches
//! checkpoint and prints the result in the same line format as
//! `segments.txt`, so settings can be tuned without re-sampling a video.

use crate::cli::SegmentsArgs;
use crate::config::apply_interval_args;
use crate::error::CliResult;

use scenesift_core::checkpoint::{format_interval_line, read_match_timestamps};
use scenesift_core::segments::{CutPlan, Inversion, build_intervals, invert_intervals};
use scenesift_core::{CoreConfigBuilder, CoreError};

use log::debug;

/// Computes the lines `scenesift segments` prints.
///
/// # Errors
///
/// * If the length or an interval setting is out of range
/// * If the matches file is missing or malformed
/// * If a match lies beyond the given length
pub fn segment_report(args: &SegmentsArgs) -> CliResult<Vec<String>> {
    if !(args.length.is_finite() && args.length > 0.0) {
        return Err(CoreError::Config(format!(
            "video length must be a positive number of seconds, got {}",
            args.length
        )));
    }

    let config = apply_interval_args(CoreConfigBuilder::new(), &args.intervals).build()?;
    let params = config.segment_params(args.length);
    let timestamps = read_match_timestamps(&args.matches_file)?;
    debug!(
        "{} matches from {}, cut span {}s",
        timestamps.len(),
        args.matches_file.display(),
        params.cut_span()
    );

    if let Some(last) = timestamps.last().filter(|t| **t > args.length) {
        return Err(CoreError::Config(format!(
            "match at {last}s lies beyond the video length of {}s",
            args.length
        )));
    }

    let intervals = build_intervals(&timestamps, &params);
    let mut lines: Vec<String> = intervals.iter().map(format_interval_line).collect();

    match CutPlan::from_intervals(intervals.clone(), args.length) {
        CutPlan::NoMatches => lines.push("# no segments".to_string()),
        CutPlan::WholeStream => lines.push("# the segment covers the whole video".to_string()),
        CutPlan::Segments(_) => {}
    }

    if args.inverse && !intervals.is_empty() {
        lines.push("# inverse".to_string());
        match invert_intervals(&intervals, args.length) {
            Inversion::FullyCovered => lines.push("# nothing outside the segments".to_string()),
            Inversion::Gaps(gaps) => lines.extend(gaps.iter().map(format_interval_line)),
        }
    }

    Ok(lines)
}

/// Prints the report to stdout.
pub fn run_segments(args: &SegmentsArgs) -> CliResult<()> {
    for line in segment_report(args)? {
        println!("{line}");
    }
    Ok(())
}
