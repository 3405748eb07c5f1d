//! Pipeline stages and their on-disk checkpoints.
//!
//! Every stage leaves a small line-oriented text file in the per-video working
//! directory. A run started with a later [`Stage`] reads these files instead of
//! recomputing the earlier stages, which makes it cheap to re-run the interval
//! builder with different parameters over the same detections.
//!
//! | stage    | file             | line format                           |
//! |----------|------------------|---------------------------------------|
//! | sample   | `samples.txt`    | `<timestamp> <image>`                 |
//! | classify | `detections.txt` | `<timestamp> <image> <LABEL>...`      |
//! | match    | `matches.txt`    | `<timestamp> <image> <LABEL>...`      |
//! | segment  | `segments.txt`   | `<begin> <end>  # <hh:mm:ss> - ...`   |

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, config_error};
use crate::segments::Interval;
use crate::utils::format_duration;

pub const SAMPLES_FILE: &str = "samples.txt";
pub const DETECTIONS_FILE: &str = "detections.txt";
pub const MATCHES_FILE: &str = "matches.txt";
pub const SEGMENTS_FILE: &str = "segments.txt";

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    #[default]
    Sample,
    Classify,
    Match,
    Segment,
    Extract,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Sample,
        Stage::Classify,
        Stage::Match,
        Stage::Segment,
        Stage::Extract,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Sample => "sample",
            Stage::Classify => "classify",
            Stage::Match => "match",
            Stage::Segment => "segment",
            Stage::Extract => "extract",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                config_error(format!(
                    "unknown stage '{s}' (expected one of: sample, classify, match, segment, extract)"
                ))
            })
    }
}

/// A sampled frame: where it was taken and the image file it was written to.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    /// Image file name, relative to the working directory
    pub image: PathBuf,
}

/// A sample together with the labels the classifier reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: f64,
    pub image: PathBuf,
    pub labels: Vec<String>,
}

// ---- Writers ----

pub fn write_samples(path: &Path, samples: &[Sample]) -> CoreResult<()> {
    let body: String = samples
        .iter()
        .map(|s| format!("{} {}\n", s.timestamp, s.image.display()))
        .collect();
    fs::write(path, body)?;
    Ok(())
}

pub fn write_observations(path: &Path, observations: &[Observation]) -> CoreResult<()> {
    let body: String = observations
        .iter()
        .map(|o| {
            let mut line = format!("{} {}", o.timestamp, o.image.display());
            for label in &o.labels {
                line.push(' ');
                line.push_str(label);
            }
            line.push('\n');
            line
        })
        .collect();
    fs::write(path, body)?;
    Ok(())
}

/// Formats one interval in the persisted form, e.g.
/// `95 155  # 00:01:35 - 00:02:35 (60s)`.
pub fn format_interval_line(interval: &Interval) -> String {
    format!(
        "{} {}  # {} - {} ({}s)",
        interval.begin,
        interval.end,
        format_duration(interval.begin),
        format_duration(interval.end),
        interval.duration()
    )
}

pub fn write_intervals(path: &Path, intervals: &[Interval]) -> CoreResult<()> {
    let body: String = intervals
        .iter()
        .map(|i| format_interval_line(i) + "\n")
        .collect();
    fs::write(path, body)?;
    Ok(())
}

// ---- Readers ----

fn checkpoint_error(path: &Path, message: impl Into<String>) -> CoreError {
    CoreError::Checkpoint(path.display().to_string(), message.into())
}

fn read_lines(path: &Path) -> CoreResult<Vec<(usize, String)>> {
    let text = fs::read_to_string(path).map_err(|e| checkpoint_error(path, e.to_string()))?;
    Ok(text
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty())
        .collect())
}

fn parse_number(path: &Path, line_no: usize, field: Option<&str>, what: &str) -> CoreResult<f64> {
    let raw = field.ok_or_else(|| checkpoint_error(path, format!("line {line_no}: missing {what}")))?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| checkpoint_error(path, format!("line {line_no}: invalid {what} '{raw}'")))
}

pub fn read_samples(path: &Path) -> CoreResult<Vec<Sample>> {
    read_lines(path)?
        .into_iter()
        .map(|(line_no, line)| {
            let mut fields = line.split_whitespace();
            let timestamp = parse_number(path, line_no, fields.next(), "timestamp")?;
            let image = fields
                .next()
                .ok_or_else(|| checkpoint_error(path, format!("line {line_no}: missing image")))?;
            Ok(Sample {
                timestamp,
                image: PathBuf::from(image),
            })
        })
        .collect()
}

pub fn read_observations(path: &Path) -> CoreResult<Vec<Observation>> {
    read_lines(path)?
        .into_iter()
        .map(|(line_no, line)| {
            let mut fields = line.split_whitespace();
            let timestamp = parse_number(path, line_no, fields.next(), "timestamp")?;
            let image = fields
                .next()
                .ok_or_else(|| checkpoint_error(path, format!("line {line_no}: missing image")))?;
            Ok(Observation {
                timestamp,
                image: PathBuf::from(image),
                labels: fields.map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Reads intervals. Anything after `#` on a line is ignored.
pub fn read_intervals(path: &Path) -> CoreResult<Vec<Interval>> {
    read_lines(path)?
        .into_iter()
        .filter_map(|(line_no, line)| {
            let data = line.split('#').next().unwrap_or_default().trim().to_string();
            (!data.is_empty()).then_some((line_no, data))
        })
        .map(|(line_no, data)| {
            let mut fields = data.split_whitespace();
            let begin = parse_number(path, line_no, fields.next(), "begin")?;
            let end = parse_number(path, line_no, fields.next(), "end")?;
            if fields.next().is_some() {
                return Err(checkpoint_error(path, format!("line {line_no}: trailing data")));
            }
            if !(0.0 <= begin && begin < end) {
                return Err(checkpoint_error(
                    path,
                    format!("line {line_no}: interval [{begin}, {end}] is empty or negative"),
                ));
            }
            Ok(Interval::new(begin, end))
        })
        .collect()
}

/// Timestamps of a match checkpoint, checked to be strictly increasing so they
/// can be fed straight to the interval builder.
pub fn read_match_timestamps(path: &Path) -> CoreResult<Vec<f64>> {
    let timestamps: Vec<f64> = read_observations(path)?
        .into_iter()
        .map(|o| o.timestamp)
        .collect();

    if let Some(pair) = timestamps.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(checkpoint_error(
            path,
            format!("timestamps are not strictly increasing ({} then {})", pair[0], pair[1]),
        ));
    }
    if timestamps.iter().any(|t| *t < 0.0) {
        return Err(checkpoint_error(path, "negative timestamp"));
    }
    Ok(timestamps)
}
