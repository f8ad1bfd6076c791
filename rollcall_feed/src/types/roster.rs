//! Roster members eligible for assignment.

use serde::{Deserialize, Serialize};

/// Unique identifier for a roster member.
pub type MemberID = i64;

/// A known person (e.g. an enrolled user) that raw identifiers may resolve to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    pub id: MemberID,

    /// Given name as stored by the membership source. May contain anomalies
    /// such as the surname repeated ("Alberto Deimann").
    pub firstname: String,

    /// Family name as stored by the membership source.
    pub lastname: String,

    #[serde(default)]
    pub email: String,
}

impl RosterMember {
    pub fn new(id: MemberID, firstname: &str, lastname: &str, email: &str) -> Self {
        Self {
            id,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            email: email.to_string(),
        }
    }

    /// `"firstname lastname"` as stored.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// `"lastname firstname"` as stored.
    pub fn reversed_name(&self) -> String {
        format!("{} {}", self.lastname, self.firstname)
    }
}

impl std::fmt::Display for RosterMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.firstname, self.lastname)
    }
}
