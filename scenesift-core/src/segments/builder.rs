// ============================================================================
// scenesift-core/src/segments/builder.rs
// ============================================================================
//
// INTERVAL BUILDER: Match Timestamps to Keep-Intervals
//
// A single left-to-right pass over the sorted match timestamps, written as a
// fold over an explicit two-state automaton:
//
//   SeekingStart --(start condition)--> InRun { start }
//   InRun        --(end condition)----> SeekingStart   (finalizes a run)
//
// A match starts a run when its predecessor is further away than the cut span,
// and ends a run when its successor is. At the stream boundaries the missing
// neighbour is replaced by the timestamp itself, i.e. the distance from zero:
//
//   start: (first AND gap_to_next <= span) OR gap_to_prev > span
//   end:   gap_to_next > span OR (last AND gap_to_prev <= span)
//
// A lone first match within one cut span of zero therefore never opens a run
// and is dropped. Every other isolated match both starts and ends a run at the
// same index.

use super::interval::{Interval, SegmentParams};

/// Automaton state carried through the fold.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RunState {
    SeekingStart,
    InRun { start: f64 },
}

/// Fold accumulator: the current state plus every finalized interval.
#[derive(Debug)]
struct Accumulator {
    state: RunState,
    intervals: Vec<Interval>,
}

/// Distances from one match to its neighbours. On a side with no neighbour the
/// gap is the timestamp itself.
#[derive(Debug, Clone, Copy)]
struct Neighbours {
    gap_to_prev: f64,
    gap_to_next: f64,
    first: bool,
    last: bool,
}

impl Neighbours {
    fn at(timestamps: &[f64], index: usize) -> Self {
        let current = timestamps[index];
        let first = index == 0;
        let last = index + 1 == timestamps.len();
        let gap_to_prev = if first {
            current
        } else {
            current - timestamps[index - 1]
        };
        let gap_to_next = if last {
            current
        } else {
            timestamps[index + 1] - current
        };
        Self {
            gap_to_prev,
            gap_to_next,
            first,
            last,
        }
    }

    fn starts_run(&self, cut_span: f64) -> bool {
        (self.first && self.gap_to_next <= cut_span) || self.gap_to_prev > cut_span
    }

    fn ends_run(&self, cut_span: f64) -> bool {
        self.gap_to_next > cut_span || (self.last && self.gap_to_prev <= cut_span)
    }
}

impl Accumulator {
    fn new(capacity: usize) -> Self {
        Self {
            state: RunState::SeekingStart,
            intervals: Vec::with_capacity(capacity),
        }
    }

    fn step(mut self, timestamp: f64, neighbours: Neighbours, params: &SegmentParams) -> Self {
        let cut_span = params.cut_span();

        if neighbours.starts_run(cut_span) {
            self.state = RunState::InRun {
                start: (timestamp - params.extension).max(0.0),
            };
        }

        if neighbours.ends_run(cut_span) {
            // An end without a recorded start is ignored.
            if let RunState::InRun { start } = self.state {
                let end = (timestamp + params.extension).min(params.duration);
                let len = end - start;
                if len > 0.0 && len >= params.min_duration {
                    self.intervals.push(Interval::new(start, end));
                } else {
                    log::debug!(
                        "Dropping run [{start:.2}, {end:.2}] ({len:.2}s < {:.2}s minimum)",
                        params.min_duration
                    );
                }
                self.state = RunState::SeekingStart;
            }
        }

        self
    }
}

/// Converts sorted match timestamps into ordered, non-overlapping keep-intervals.
///
/// Every returned interval satisfies `0 <= begin < end <= params.duration` and
/// `end - begin >= params.min_duration`. Consecutive intervals are separated
/// by a gap of positive length. An empty input yields an empty output.
///
/// # Panics
///
/// Panics if the timestamps are not finite, non-negative and strictly
/// increasing, or if any parameter is negative or non-finite. These are
/// contract violations of the caller, not runtime conditions.
///
/// # Examples
///
/// ```
/// use scenesift_core::segments::{Interval, SegmentParams, build_intervals};
///
/// let params = SegmentParams {
///     extension: 2.0,
///     gap_threshold: 10.0,
///     min_duration: 1.0,
///     keyframe_slack: 1.0,
///     duration: 100.0,
/// };
/// let intervals = build_intervals(&[10.0, 15.0, 50.0], &params);
/// assert_eq!(intervals, vec![Interval::new(8.0, 17.0), Interval::new(48.0, 52.0)]);
/// ```
#[must_use]
pub fn build_intervals(timestamps: &[f64], params: &SegmentParams) -> Vec<Interval> {
    check_preconditions(timestamps, params);

    (0..timestamps.len())
        .fold(Accumulator::new(timestamps.len() / 2 + 1), |acc, index| {
            acc.step(timestamps[index], Neighbours::at(timestamps, index), params)
        })
        .intervals
}

fn check_preconditions(timestamps: &[f64], params: &SegmentParams) {
    for (name, value) in [
        ("extension", params.extension),
        ("gap_threshold", params.gap_threshold),
        ("min_duration", params.min_duration),
        ("keyframe_slack", params.keyframe_slack),
        ("duration", params.duration),
    ] {
        assert!(
            value.is_finite() && value >= 0.0,
            "segment parameter {name} must be finite and non-negative, got {value}"
        );
    }

    assert!(
        timestamps.iter().all(|t| t.is_finite() && *t >= 0.0),
        "match timestamps must be finite and non-negative"
    );
    assert!(
        timestamps.windows(2).all(|pair| pair[0] < pair[1]),
        "match timestamps must be strictly increasing"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(extension: f64, gap_threshold: f64, keyframe_slack: f64, min_duration: f64, duration: f64) -> SegmentParams {
        SegmentParams {
            extension,
            gap_threshold,
            min_duration,
            keyframe_slack,
            duration,
        }
    }

    #[test]
    fn test_single_match_produces_padded_interval() {
        let result = build_intervals(&[10.0], &params(3.0, 30.0, 0.0, 1.0, 100.0));
        assert_eq!(result, vec![Interval::new(7.0, 13.0)]);
    }

    #[test]
    fn test_gap_larger_than_cut_span_splits_runs() {
        let result = build_intervals(&[10.0, 15.0, 50.0], &params(2.0, 10.0, 1.0, 1.0, 100.0));
        assert_eq!(result, vec![Interval::new(8.0, 17.0), Interval::new(48.0, 52.0)]);
    }

    #[test]
    fn test_gap_equal_to_cut_span_keeps_run_together() {
        // cut span = 10 + 4 + 2 = 16
        let result = build_intervals(&[10.0, 26.0], &params(2.0, 10.0, 1.0, 1.0, 100.0));
        assert_eq!(result, vec![Interval::new(8.0, 28.0)]);
    }

    #[test]
    fn test_extension_clamps_to_stream_bounds() {
        let result = build_intervals(&[5.0], &params(10.0, 30.0, 0.0, 1.0, 8.0));
        assert_eq!(result, vec![Interval::new(0.0, 8.0)]);
    }

    #[test]
    fn test_no_matches_yields_no_intervals() {
        assert!(build_intervals(&[], &params(5.0, 30.0, 1.0, 20.0, 600.0)).is_empty());
    }

    #[test]
    fn test_short_runs_are_dropped_silently() {
        // Isolated points at 100 and 320 become 10s runs; only the 200..260 run is long enough.
        let timestamps = [100.0, 200.0, 220.0, 240.0, 260.0, 320.0];
        let result = build_intervals(&timestamps, &params(5.0, 30.0, 1.0, 20.0, 600.0));
        assert_eq!(result, vec![Interval::new(195.0, 265.0)]);
    }

    #[test]
    fn test_zero_length_run_is_never_emitted() {
        // Match sits exactly on the end of the stream with no padding.
        let result = build_intervals(&[8.0], &params(0.0, 30.0, 0.0, 0.0, 8.0));
        assert!(result.is_empty());
    }

    #[test]
    fn test_lone_first_match_near_stream_start_is_dropped() {
        // cut span = 10 + 10 + 0 = 20; the match at 1s is within it of zero.
        let result = build_intervals(&[1.0, 100.0, 110.0], &params(5.0, 10.0, 0.0, 1.0, 305.0));
        assert_eq!(result, vec![Interval::new(95.0, 115.0)]);
    }

    #[test]
    fn test_isolated_last_match_forms_its_own_run() {
        let timestamps = [1.0, 100.0, 110.0, 300.0];
        let result = build_intervals(&timestamps, &params(5.0, 10.0, 0.0, 1.0, 305.0));
        assert_eq!(
            result,
            vec![Interval::new(95.0, 115.0), Interval::new(295.0, 305.0)]
        );
    }

    #[test]
    fn test_lone_first_match_beyond_cut_span_is_kept() {
        let result = build_intervals(&[30.0, 100.0], &params(5.0, 10.0, 0.0, 1.0, 200.0));
        assert_eq!(
            result,
            vec![Interval::new(25.0, 35.0), Interval::new(95.0, 105.0)]
        );
    }

    #[test]
    fn test_first_match_near_start_with_close_successor_opens_run() {
        // The first match has no run of its own but still opens one with its neighbour.
        let result = build_intervals(&[1.0, 15.0], &params(5.0, 10.0, 0.0, 1.0, 100.0));
        assert_eq!(result, vec![Interval::new(0.0, 20.0)]);
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn test_unsorted_timestamps_panic() {
        let _ = build_intervals(&[20.0, 10.0], &params(1.0, 1.0, 0.0, 0.0, 100.0));
    }

    #[test]
    #[should_panic(expected = "duration")]
    fn test_negative_duration_panics() {
        let _ = build_intervals(&[1.0], &params(1.0, 1.0, 0.0, 0.0, -5.0));
    }
}
