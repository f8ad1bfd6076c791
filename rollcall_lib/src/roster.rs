//! Roster preparation: per-run variant index and duplicate cleanup.

use std::collections::HashSet;

use crate::name_parser::{parse_roster_name, NameVariant};
use crate::RosterMember;

/// Roster members with their name variants computed once per resolution run.
///
/// Members are addressed by position; the index never reorders or mutates them.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    members: Vec<RosterMember>,
    variants: Vec<Vec<NameVariant>>,
}

impl RosterIndex {
    pub fn new(members: Vec<RosterMember>) -> Self {
        let variants = members.iter().map(parse_roster_name).collect();
        Self { members, variants }
    }

    pub fn members(&self) -> &[RosterMember] {
        &self.members
    }

    pub fn get(&self, index: usize) -> Option<&RosterMember> {
        self.members.get(index)
    }

    /// Name variants of the member at `index`; empty when out of range.
    pub fn variants(&self, index: usize) -> &[NameVariant] {
        self.variants.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(index, member, variants)` in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RosterMember, &[NameVariant])> {
        self.members
            .iter()
            .zip(self.variants.iter())
            .enumerate()
            .map(|(i, (m, v))| (i, m, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn member_key(member: &RosterMember) -> String {
    format!(
        "{}|{}",
        member.firstname.trim().to_lowercase(),
        member.lastname.trim().to_lowercase()
    )
}

/// Drop words of `primary` that also occur in `other`. Words shorter than two
/// characters are always kept, and if nothing would remain the field is kept as is.
fn remove_duplicate_words(primary: &str, other: &str) -> String {
    let primary = primary.trim();
    let other = other.trim();
    if primary.is_empty() || other.is_empty() {
        return primary.to_string();
    }

    let other_words: HashSet<String> = other.split_whitespace().map(str::to_lowercase).collect();
    let kept: Vec<&str> = primary
        .split_whitespace()
        .filter(|w| w.chars().count() < 2 || !other_words.contains(&w.to_lowercase()))
        .collect();

    if kept.is_empty() {
        primary.to_string()
    } else {
        kept.join(" ")
    }
}

/// Remove repeated roster entries and words duplicated across name fields.
///
/// Members are considered duplicates when their trimmed, case-insensitive
/// `(firstname, lastname)` pair matches; the first occurrence wins. Surviving
/// members get each field stripped of words found in the other field, which
/// turns `{"Alberto Deimann", "Deimann"}` into `{"Alberto", "Deimann"}`.
pub fn deduplicate(members: &[RosterMember]) -> Vec<RosterMember> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(members.len());

    for member in members {
        if !seen.insert(member_key(member)) {
            tracing::debug!("Dropping duplicate roster entry {} ({})", member.id, member);
            continue;
        }
        let mut m = member.clone();
        m.firstname = remove_duplicate_words(&member.firstname, &member.lastname);
        m.lastname = remove_duplicate_words(&member.lastname, &member.firstname);
        cleaned.push(m);
    }

    cleaned
}
