//! Property tests for the interval builder and inverter.

use proptest::prelude::*;
use scenesift_core::segments::{Interval, Inversion, SegmentParams, build_intervals, invert_intervals};

fn timestamps() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0u32..20_000, 0..60).prop_map(|mut raw| {
        raw.sort_unstable();
        raw.dedup();
        // Tenths of a second, like a sampler with sub-second offsets.
        raw.into_iter().map(|t| f64::from(t) / 10.0).collect()
    })
}

fn params_for(last: f64) -> impl Strategy<Value = SegmentParams> {
    (0u32..30, 0u32..90, 0u32..3, 0u32..90, 0u32..100).prop_map(
        move |(extension, gap_threshold, slack, min_duration, tail)| SegmentParams {
            extension: f64::from(extension),
            gap_threshold: f64::from(gap_threshold),
            keyframe_slack: f64::from(slack) / 2.0,
            min_duration: f64::from(min_duration),
            duration: last + f64::from(tail),
        },
    )
}

fn case() -> impl Strategy<Value = (Vec<f64>, SegmentParams)> {
    timestamps().prop_flat_map(|ts| {
        let last = ts.last().copied().unwrap_or(0.0);
        (Just(ts), params_for(last))
    })
}

proptest! {
    #[test]
    fn intervals_stay_in_bounds_and_long_enough((ts, params) in case()) {
        for interval in build_intervals(&ts, &params) {
            prop_assert!(0.0 <= interval.begin);
            prop_assert!(interval.begin < interval.end);
            prop_assert!(interval.end <= params.duration);
            prop_assert!(interval.duration() >= params.min_duration);
        }
    }

    #[test]
    fn intervals_are_sorted_and_disjoint((ts, params) in case()) {
        let intervals = build_intervals(&ts, &params);
        for pair in intervals.windows(2) {
            prop_assert!(pair[0].end < pair[1].begin, "{} overlaps {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn every_interval_covers_a_match((ts, params) in case()) {
        for interval in build_intervals(&ts, &params) {
            prop_assert!(ts.iter().any(|t| interval.begin <= *t && *t <= interval.end));
        }
    }

    #[test]
    fn building_is_deterministic((ts, params) in case()) {
        prop_assert_eq!(build_intervals(&ts, &params), build_intervals(&ts, &params));
    }

    #[test]
    fn inverting_twice_restores_the_keep_set((ts, params) in case()) {
        let keep = build_intervals(&ts, &params);
        prop_assume!(!keep.is_empty());

        match invert_intervals(&keep, params.duration) {
            Inversion::FullyCovered => {
                prop_assert_eq!(keep, vec![Interval::new(0.0, params.duration)]);
            }
            Inversion::Gaps(gaps) => {
                prop_assert!(!gaps.is_empty());
                prop_assert_eq!(invert_intervals(&gaps, params.duration), Inversion::Gaps(keep));
            }
        }
    }

    #[test]
    fn keep_and_gaps_partition_the_stream((ts, params) in case()) {
        let keep = build_intervals(&ts, &params);
        prop_assume!(!keep.is_empty());

        let kept: f64 = keep.iter().map(Interval::duration).sum();
        let dropped: f64 = invert_intervals(&keep, params.duration)
            .intervals()
            .iter()
            .map(Interval::duration)
            .sum();
        prop_assert!((kept + dropped - params.duration).abs() < 1e-6);
    }
}
