//! Raw participation events reported by a meeting-data provider.

use serde::{Deserialize, Serialize};

use crate::timestamp;

/// One join/leave event for one device of one participant.
///
/// A participant who rejoins or connects from several devices appears as
/// several records. Timestamps that are missing or unparseable are `None`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRecord {
    /// Display name as shown by the meeting provider.
    #[serde(default)]
    pub name: String,

    /// Email reported by the provider, if the participant was signed in.
    #[serde(default)]
    pub user_email: Option<String>,

    /// Join time in epoch seconds.
    #[serde(default, deserialize_with = "timestamp::lenient::deserialize")]
    pub join_time: Option<i64>,

    /// Leave time in epoch seconds.
    #[serde(default, deserialize_with = "timestamp::lenient::deserialize")]
    pub leave_time: Option<i64>,
}

impl ParticipationRecord {
    /// Returns the email if present and non-blank.
    pub fn email(&self) -> Option<&str> {
        self.user_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// A feed document: either a bare list of records or `{ "participants": [...] }`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ParticipationFeed {
    Wrapped { participants: Vec<ParticipationRecord> },
    Bare(Vec<ParticipationRecord>),
}

impl ParticipationFeed {
    pub fn into_records(self) -> Vec<ParticipationRecord> {
        match self {
            Self::Wrapped { participants } => participants,
            Self::Bare(records) => records,
        }
    }
}
