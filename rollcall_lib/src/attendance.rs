//! Per-participant attendance: grouping raw feed records, consolidating their
//! intervals, and evaluating completion against the session threshold.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::accent::fold;
use crate::interval::{total_for_range, TimeInterval};
use crate::{ParticipationRecord, SessionConfig};

/// The authoritative meeting period, `[start, end)` in epoch seconds.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: i64,
    pub end: i64,
}

impl SessionWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Window length in seconds; 0 for an invalid window. Saturates at `i64::MAX`.
    pub fn length(&self) -> i64 {
        self.end.saturating_sub(self.start).max(0)
    }
}

impl From<&SessionConfig> for SessionWindow {
    fn from(config: &SessionConfig) -> Self {
        Self::new(config.window_start, config.window_end)
    }
}

/// Grouping identity for raw intervals before identity resolution.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParticipantKey {
    Email(String),
    DisplayName(String),
}

impl ParticipantKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(s) | Self::DisplayName(s) => s,
        }
    }
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Email when present, otherwise the accent-folded, lowercased display name
/// with whitespace collapsed.
pub fn participant_key(record: &ParticipationRecord) -> ParticipantKey {
    match record.email() {
        Some(email) => ParticipantKey::Email(email.to_lowercase()),
        None => ParticipantKey::DisplayName(
            fold(&record.name).split_whitespace().collect::<Vec<_>>().join(" "),
        ),
    }
}

/// Consolidated attendance of one participant key.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParticipantAttendance {
    pub key: ParticipantKey,
    /// Display name of the first record seen for this key.
    pub display_name: String,
    pub email: Option<String>,
    /// Usable (positive-length) intervals.
    pub interval_count: usize,
    /// Records with a missing timestamp or a non-positive span.
    pub dropped_intervals: usize,
    pub total_seconds: i64,
}

#[derive(Default)]
struct Group {
    display_name: String,
    email: Option<String>,
    intervals: Vec<TimeInterval>,
    dropped: usize,
}

/// Group records by [`participant_key`] and total each group inside the window.
///
/// Output is ordered by key. Malformed records are counted, never rejected.
pub fn aggregate_participants(
    records: &[ParticipationRecord],
    window: SessionWindow,
) -> Vec<ParticipantAttendance> {
    let mut groups: BTreeMap<ParticipantKey, Group> = BTreeMap::new();

    for record in records {
        let group = groups.entry(participant_key(record)).or_insert_with(|| Group {
            display_name: record.name.trim().to_string(),
            email: record.email().map(str::to_string),
            ..Group::default()
        });
        match TimeInterval::from_bounds(record.join_time, record.leave_time) {
            Some(interval) if interval.is_valid() => group.intervals.push(interval),
            _ => group.dropped += 1,
        }
    }

    groups
        .into_iter()
        .map(|(key, group)| {
            if group.dropped > 0 {
                tracing::debug!("Dropped {} malformed intervals for {}", group.dropped, key);
            }
            ParticipantAttendance {
                total_seconds: total_for_range(&group.intervals, window.start, window.end),
                interval_count: group.intervals.len(),
                dropped_intervals: group.dropped,
                display_name: group.display_name,
                email: group.email,
                key,
            }
        })
        .collect()
}

/// Attendance percentage and threshold outcome.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStatus {
    /// Whole percentage points, rounded half up.
    pub percentage: u32,
    pub completion_met: bool,
}

/// `total_seconds / window length * 100`, rounded to the nearest point with 0.5
/// going up, compared against `required_percent`. An invalid window gives 0%
/// and not met.
pub fn evaluate_completion(
    total_seconds: i64,
    window: SessionWindow,
    required_percent: u32,
) -> CompletionStatus {
    if !window.is_valid() {
        return CompletionStatus {
            percentage: 0,
            completion_met: false,
        };
    }
    let duration = i128::from(window.length());
    let total = i128::from(total_seconds).clamp(0, duration);
    let percentage = ((200 * total + duration) / (2 * duration)) as u32;
    CompletionStatus {
        percentage,
        completion_met: percentage >= required_percent,
    }
}
