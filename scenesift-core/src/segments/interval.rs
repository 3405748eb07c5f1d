//! Interval and parameter types shared by the builder and the inverter.

use std::fmt;

/// A contiguous span of the source timeline, in seconds.
///
/// Intervals produced by this crate always satisfy `0 <= begin <= end <= duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub begin: f64,
    pub end: f64,
}

impl Interval {
    /// Creates an interval. Panics in debug builds if `begin > end`.
    pub fn new(begin: f64, end: f64) -> Self {
        debug_assert!(begin <= end, "interval begins after it ends: {begin} > {end}");
        Self { begin, end }
    }

    /// Length of the interval in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.begin, self.end)
    }
}

/// Tuning knobs for [`build_intervals`](super::build_intervals).
///
/// All values are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    /// Padding added on both sides of every run before clamping.
    pub extension: f64,

    /// Longest silence between two matches that still keeps them in one run.
    pub gap_threshold: f64,

    /// Runs shorter than this are dropped.
    pub min_duration: f64,

    /// Safety margin per side for the cutter snapping to keyframes.
    pub keyframe_slack: f64,

    /// Usable stream length; every interval is clamped to `[0, duration]`.
    pub duration: f64,
}

impl SegmentParams {
    /// Maximum distance between consecutive matches belonging to the same run.
    ///
    /// Both ends of a run are pushed outward by `extension` and the cutter may
    /// snap each side to a keyframe, so the raw gap threshold is widened by
    /// both margins on each side.
    #[must_use]
    pub fn cut_span(&self) -> f64 {
        self.gap_threshold + 2.0 * self.extension + 2.0 * self.keyframe_slack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_span_adds_both_margins_twice() {
        let params = SegmentParams {
            extension: 2.0,
            gap_threshold: 10.0,
            min_duration: 1.0,
            keyframe_slack: 1.0,
            duration: 100.0,
        };
        assert_eq!(params.cut_span(), 16.0);
    }

    #[test]
    fn test_interval_display_and_duration() {
        let interval = Interval::new(7.0, 13.5);
        assert_eq!(interval.duration(), 6.5);
        assert_eq!(interval.to_string(), "[7, 13.5]");
    }
}
