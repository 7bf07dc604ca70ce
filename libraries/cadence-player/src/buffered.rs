//! Buffered time range tracking
//!
//! The engine only reports the interval it is currently downloading, never
//! the cumulative history. `BufferedRanges` accumulates every reported
//! interval and keeps the set coalesced so "is the playhead buffered" can be
//! answered after earlier ranges have dropped out of the engine's report.

use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A contiguous span of loaded media time, `[start, start + length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start of the span
    pub start: Duration,

    /// Length of the span
    pub length: Duration,
}

impl TimeRange {
    pub fn new(start: Duration, length: Duration) -> Self {
        Self { start, length }
    }

    /// Build a range from engine-reported seconds
    ///
    /// Negative, NaN or infinite values are rejected here rather than clamped.
    pub fn from_secs_f64(start: f64, length: f64) -> Result<Self> {
        let invalid = || PlayerError::InvalidRange { start, length };
        Ok(Self {
            start: Duration::try_from_secs_f64(start).map_err(|_| invalid())?,
            length: Duration::try_from_secs_f64(length).map_err(|_| invalid())?,
        })
    }

    /// Exclusive end of the span
    pub fn end(&self) -> Duration {
        self.start + self.length
    }

    /// Half-open containment: a point exactly at `end()` is not covered
    pub fn contains(&self, at: Duration) -> bool {
        self.start <= at && at < self.end()
    }
}

/// Set of loaded ranges, sorted by start and pairwise disjoint
///
/// Ranges that overlap or touch are always merged, so no two stored ranges
/// share a boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedRanges {
    ranges: Vec<TimeRange>,
}

impl BufferedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything (source change)
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Insert a range and re-coalesce the set
    pub fn add_range(&mut self, range: TimeRange) {
        if range.length.is_zero() {
            return;
        }

        self.ranges.push(range);
        self.ranges.sort_by_key(|r| r.start);

        let mut merged: Vec<TimeRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.end() >= range.start => {
                    let end = prev.end().max(range.end());
                    prev.length = end - prev.start;
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }

    /// Whether data is loaded at `at`
    pub fn can_play(&self, at: Duration) -> bool {
        // first range starting after `at`; only its predecessor can cover it
        let idx = self.ranges.partition_point(|r| r.start <= at);
        idx > 0 && self.ranges[idx - 1].contains(at)
    }

    /// End of the first range covering or following `position`
    pub fn leading_edge_from(&self, position: Duration) -> Option<Duration> {
        self.ranges
            .iter()
            .find(|r| r.end() > position)
            .map(TimeRange::end)
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn range(start: u64, length: u64) -> TimeRange {
        TimeRange::new(secs(start), secs(length))
    }

    #[test]
    fn abutting_ranges_merge() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(0, 5));
        buffered.add_range(range(5, 3));
        buffered.add_range(range(20, 2));

        assert_eq!(buffered.ranges(), &[range(0, 8), range(20, 2)]);
    }

    #[test]
    fn out_of_order_ranges_are_sorted() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(30, 5));
        buffered.add_range(range(10, 5));
        buffered.add_range(range(0, 2));

        assert_eq!(
            buffered.ranges(),
            &[range(0, 2), range(10, 5), range(30, 5)]
        );
    }

    #[test]
    fn bridging_range_collapses_neighbours() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(0, 5));
        buffered.add_range(range(10, 5));
        buffered.add_range(range(4, 7));

        assert_eq!(buffered.ranges(), &[range(0, 15)]);
    }

    #[test]
    fn contained_range_is_absorbed() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(0, 20));
        buffered.add_range(range(5, 2));

        assert_eq!(buffered.ranges(), &[range(0, 20)]);
    }

    #[test]
    fn re_adding_covered_range_is_idempotent() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(0, 10));
        buffered.add_range(range(40, 10));
        let before = buffered.clone();

        buffered.add_range(range(0, 10));
        buffered.add_range(range(42, 3));

        assert_eq!(buffered, before);
    }

    #[test]
    fn zero_length_range_is_ignored() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(3, 0));
        assert!(buffered.is_empty());
    }

    #[test]
    fn can_play_is_half_open() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(8, 5));

        assert!(!buffered.can_play(secs(7)));
        assert!(buffered.can_play(secs(8)));
        assert!(buffered.can_play(secs(12)));
        assert!(!buffered.can_play(secs(13)));
    }

    #[test]
    fn can_play_across_merged_boundary() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(0, 5));
        buffered.add_range(range(5, 5));

        assert!(buffered.can_play(secs(5)));
        assert!(!buffered.can_play(secs(10)));
    }

    #[test]
    fn clear_empties_set() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(0, 5));
        buffered.clear();

        assert!(buffered.is_empty());
        assert!(!buffered.can_play(secs(1)));
    }

    #[test]
    fn leading_edge_skips_ranges_behind_playhead() {
        let mut buffered = BufferedRanges::new();
        buffered.add_range(range(0, 5));
        buffered.add_range(range(20, 10));

        assert_eq!(buffered.leading_edge_from(secs(2)), Some(secs(5)));
        assert_eq!(buffered.leading_edge_from(secs(5)), Some(secs(30)));
        assert_eq!(buffered.leading_edge_from(secs(12)), Some(secs(30)));
        assert_eq!(buffered.leading_edge_from(secs(30)), None);
    }

    #[test]
    fn from_secs_rejects_negative_and_nan() {
        assert!(TimeRange::from_secs_f64(1.0, 2.5).is_ok());
        assert!(matches!(
            TimeRange::from_secs_f64(1.0, -0.5),
            Err(PlayerError::InvalidRange { .. })
        ));
        assert!(TimeRange::from_secs_f64(-1.0, 1.0).is_err());
        assert!(TimeRange::from_secs_f64(f64::NAN, 1.0).is_err());
        assert!(TimeRange::from_secs_f64(0.0, f64::INFINITY).is_err());
    }
}
