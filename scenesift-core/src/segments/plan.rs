//! Classification of builder output into the three terminal outcomes.

use super::builder::build_intervals;
use super::interval::{Interval, SegmentParams};

/// An interval ending within this many seconds of the stream end counts as
/// reaching it, which absorbs the last partial sampling step.
pub const WHOLE_STREAM_TOLERANCE_SECS: f64 = 1.0;

/// What the extraction stage should do with a video.
#[derive(Debug, Clone, PartialEq)]
pub enum CutPlan {
    /// No interval survived; there is nothing to extract.
    NoMatches,
    /// A single interval spans the whole stream; the source is already the result.
    WholeStream,
    /// Cut these intervals and concatenate them in order.
    Segments(Vec<Interval>),
}

impl CutPlan {
    /// Runs the interval builder and classifies its output.
    #[must_use]
    pub fn from_matches(timestamps: &[f64], params: &SegmentParams) -> Self {
        Self::from_intervals(build_intervals(timestamps, params), params.duration)
    }

    /// Classifies an already built interval list.
    ///
    /// Only a list with exactly one interval can be the whole stream. A list
    /// whose first interval spans the stream but has further entries is
    /// inconsistent; it is logged and treated as a normal cut.
    #[must_use]
    pub fn from_intervals(intervals: Vec<Interval>, duration: f64) -> Self {
        match intervals.as_slice() {
            [] => CutPlan::NoMatches,
            [only] if spans_stream(only, duration) => CutPlan::WholeStream,
            [first, ..] => {
                if spans_stream(first, duration) {
                    log::warn!(
                        "First of {} intervals already spans the stream ({first}); cutting anyway",
                        intervals.len()
                    );
                }
                CutPlan::Segments(intervals)
            }
        }
    }

    /// The intervals to extract, empty for the two short-circuit outcomes.
    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        match self {
            CutPlan::Segments(intervals) => intervals,
            CutPlan::NoMatches | CutPlan::WholeStream => &[],
        }
    }
}

fn spans_stream(interval: &Interval, duration: f64) -> bool {
    interval.begin == 0.0 && interval.end >= duration - WHOLE_STREAM_TOLERANCE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_intervals_mean_no_matches() {
        assert_eq!(CutPlan::from_intervals(Vec::new(), 100.0), CutPlan::NoMatches);
    }

    #[test]
    fn test_single_full_interval_is_whole_stream() {
        let plan = CutPlan::from_intervals(vec![Interval::new(0.0, 100.0)], 100.0);
        assert_eq!(plan, CutPlan::WholeStream);
        assert!(plan.intervals().is_empty());
    }

    #[test]
    fn test_interval_within_tolerance_of_end_is_whole_stream() {
        let plan = CutPlan::from_intervals(vec![Interval::new(0.0, 99.2)], 100.0);
        assert_eq!(plan, CutPlan::WholeStream);
    }

    #[test]
    fn test_interval_not_starting_at_zero_is_a_cut() {
        let plan = CutPlan::from_intervals(vec![Interval::new(0.5, 100.0)], 100.0);
        assert_eq!(plan, CutPlan::Segments(vec![Interval::new(0.5, 100.0)]));
    }

    #[test]
    fn test_inconsistent_multi_interval_list_stays_a_cut() {
        let intervals = vec![Interval::new(0.0, 100.0), Interval::new(100.0, 100.0)];
        let plan = CutPlan::from_intervals(intervals.clone(), 100.0);
        assert_eq!(plan, CutPlan::Segments(intervals));
    }
}
