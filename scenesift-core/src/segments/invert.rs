//! Complement of a keep-set, used for the optional inverse compilation.

use super::interval::Interval;

/// Result of inverting a keep-set against the stream duration.
#[derive(Debug, Clone, PartialEq)]
pub enum Inversion {
    /// The keep-set already spans `[0, duration]`; nothing was discarded.
    FullyCovered,
    /// Discarded spans, ordered and non-overlapping, each of positive length.
    Gaps(Vec<Interval>),
}

impl Inversion {
    /// The discarded intervals, empty when fully covered.
    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        match self {
            Inversion::FullyCovered => &[],
            Inversion::Gaps(gaps) => gaps,
        }
    }
}

/// Derives the intervals of `[0, duration]` not covered by `keep`.
///
/// Zero-length gaps (touching keep intervals, or a keep-set that starts at 0
/// or ends at `duration`) are not emitted, so inverting the returned gaps a
/// second time reproduces `keep` whenever its intervals have positive length.
///
/// # Panics
///
/// Panics if `keep` is empty, unordered, overlapping, or reaches outside
/// `[0, duration]`. An empty keep-set means nothing matched, which callers
/// must handle before asking for the discarded material.
///
/// # Examples
///
/// ```
/// use scenesift_core::segments::{Interval, Inversion, invert_intervals};
///
/// let keep = [Interval::new(10.0, 20.0), Interval::new(40.0, 50.0)];
/// assert_eq!(
///     invert_intervals(&keep, 100.0),
///     Inversion::Gaps(vec![
///         Interval::new(0.0, 10.0),
///         Interval::new(20.0, 40.0),
///         Interval::new(50.0, 100.0),
///     ])
/// );
/// ```
#[must_use]
pub fn invert_intervals(keep: &[Interval], duration: f64) -> Inversion {
    assert!(!keep.is_empty(), "cannot invert an empty keep-set");
    assert!(
        duration.is_finite() && duration >= 0.0,
        "duration must be finite and non-negative, got {duration}"
    );
    assert!(
        keep.iter().all(|iv| 0.0 <= iv.begin && iv.begin <= iv.end && iv.end <= duration),
        "keep intervals must lie within [0, {duration}]"
    );
    assert!(
        keep.windows(2).all(|pair| pair[0].end <= pair[1].begin),
        "keep intervals must be ordered and non-overlapping"
    );

    let (mut gaps, cursor) = keep.iter().fold((Vec::new(), 0.0_f64), |(mut gaps, cursor), iv| {
        if iv.begin > cursor {
            gaps.push(Interval::new(cursor, iv.begin));
        }
        (gaps, iv.end)
    });

    if duration > cursor {
        gaps.push(Interval::new(cursor, duration));
    }

    if gaps.is_empty() {
        Inversion::FullyCovered
    } else {
        Inversion::Gaps(gaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_keep_set_yields_three_gaps() {
        let keep = [Interval::new(10.0, 20.0), Interval::new(40.0, 50.0)];
        let gaps = invert_intervals(&keep, 100.0);
        assert_eq!(
            gaps.intervals(),
            &[
                Interval::new(0.0, 10.0),
                Interval::new(20.0, 40.0),
                Interval::new(50.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_keep_set_touching_both_ends_has_only_inner_gap() {
        let keep = [Interval::new(0.0, 30.0), Interval::new(60.0, 90.0)];
        assert_eq!(
            invert_intervals(&keep, 90.0),
            Inversion::Gaps(vec![Interval::new(30.0, 60.0)])
        );
    }

    #[test]
    fn test_full_coverage_is_reported_explicitly() {
        let keep = [Interval::new(0.0, 100.0)];
        assert_eq!(invert_intervals(&keep, 100.0), Inversion::FullyCovered);
        assert!(Inversion::FullyCovered.intervals().is_empty());
    }

    #[test]
    fn test_adjacent_keep_intervals_cover_without_gap() {
        let keep = [Interval::new(0.0, 40.0), Interval::new(40.0, 100.0)];
        assert_eq!(invert_intervals(&keep, 100.0), Inversion::FullyCovered);
    }

    #[test]
    #[should_panic(expected = "empty keep-set")]
    fn test_empty_keep_set_is_a_contract_violation() {
        let _ = invert_intervals(&[], 100.0);
    }

    #[test]
    #[should_panic(expected = "non-overlapping")]
    fn test_overlapping_keep_set_panics() {
        let keep = [Interval::new(0.0, 50.0), Interval::new(40.0, 60.0)];
        let _ = invert_intervals(&keep, 100.0);
    }
}
