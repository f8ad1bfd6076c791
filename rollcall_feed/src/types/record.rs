//! Persisted attendance rows whose identity has not been resolved yet.

use serde::{Deserialize, Serialize};

/// Unique identifier for an attendance record.
pub type RecordID = i64;

/// An attendance record bucketed as guest/unassigned by the caller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnassignedRecord {
    pub id: RecordID,

    /// Raw participant identifier: a display name or an email address.
    pub name: String,
}

impl UnassignedRecord {
    pub fn new(id: RecordID, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}
