//! Interval consolidation: merge overlapping join/leave spans and clip them to
//! the session window.
//!
//! A participant connected from two devices at once, or one who rejoins before
//! the previous leave event was recorded, produces overlapping intervals. The
//! consolidated total never counts the same second twice.

use serde::Serialize;

/// A presence span `[start, end)` in epoch seconds.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: i64,
    pub end: i64,
}

impl TimeInterval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Builds an interval from optional feed fields, `None` when either side is missing.
    pub fn from_bounds(start: Option<i64>, end: Option<i64>) -> Option<Self> {
        Some(Self::new(start?, end?))
    }

    /// Positive-length spans only.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn duration(&self) -> i64 {
        self.end.saturating_sub(self.start).max(0)
    }
}

/// Merge overlapping or touching intervals.
///
/// Intervals with `start >= end` are dropped. The result is sorted by start and
/// non-overlapping; adjacent spans (`next.start == current.end`) are joined.
pub fn merge(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut valid: Vec<TimeInterval> = intervals
        .iter()
        .copied()
        .filter(TimeInterval::is_valid)
        .collect();
    if valid.is_empty() {
        return Vec::new();
    }
    valid.sort_by_key(|i| i.start);

    let mut merged = Vec::with_capacity(valid.len());
    let mut current = valid[0];
    for next in &valid[1..] {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = *next;
        }
    }
    merged.push(current);
    merged
}

/// Sum the part of each merged interval that falls inside `[window_start, window_end)`.
///
/// Expects the output of [`merge`]; overlapping input would be double counted.
pub fn clip_and_sum(merged: &[TimeInterval], window_start: i64, window_end: i64) -> i64 {
    merged
        .iter()
        .map(|interval| {
            let clipped_start = interval.start.max(window_start);
            let clipped_end = interval.end.min(window_end);
            clipped_end.saturating_sub(clipped_start).max(0)
        })
        .fold(0, i64::saturating_add)
}

/// Total non-overlapping seconds of presence inside the window.
///
/// Returns 0 for an empty input or an inverted/empty window.
pub fn total_for_range(intervals: &[TimeInterval], window_start: i64, window_end: i64) -> i64 {
    if window_start >= window_end || intervals.is_empty() {
        return 0;
    }
    clip_and_sum(&merge(intervals), window_start, window_end)
}
