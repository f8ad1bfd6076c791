//! Session configuration supplied by the session owner.

use serde::{Deserialize, Serialize};

use crate::timestamp;

/// The authoritative meeting window and the attendance threshold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Window start in epoch seconds.
    #[serde(deserialize_with = "timestamp::strict::deserialize")]
    pub window_start: i64,

    /// Window end in epoch seconds.
    #[serde(deserialize_with = "timestamp::strict::deserialize")]
    pub window_end: i64,

    /// Minimum attendance percentage (0-100) required for completion.
    #[serde(default)]
    pub required_attendance_percent: u32,
}
