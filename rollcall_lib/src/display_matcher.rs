//! Exact display-name comparison against roster full names.

use std::sync::LazyLock;

use regex::Regex;

use crate::accent::matches_without_accents;
use crate::roster::RosterIndex;

/// Trailing office or device tags: " - comune di lodi", " (ospite)", " - ufficio".
static ORGANIZATION_SUFFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r" - comune di [a-z\s]+$",
        r" - provincia di [a-z\s]+$",
        r" \([^)]+\)$",
        r" - [a-z\s]+$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("suffix regex compiles"))
    .collect()
});

/// Trimmed, lowercased identifier. Accents are kept; accent-insensitive
/// comparison is a separate, lower-confidence step.
pub fn normalize_display_name(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Remove trailing organization tags from a normalized display name.
pub fn strip_organization_suffix(normalized: &str) -> String {
    let mut cleaned = normalized.to_string();
    for re in ORGANIZATION_SUFFIXES.iter() {
        cleaned = re.replace(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

fn direct_match(roster: &RosterIndex, normalized: &str) -> Option<usize> {
    roster
        .members()
        .iter()
        .position(|m| m.full_name().to_lowercase() == normalized)
}

fn reversed_match(roster: &RosterIndex, normalized: &str) -> Option<usize> {
    roster
        .members()
        .iter()
        .position(|m| m.reversed_name().to_lowercase() == normalized)
}

/// Exact "first last" or "last first" equality, retried after stripping a
/// trailing organization tag. First roster hit wins.
pub fn exact_name_match(roster: &RosterIndex, identifier: &str) -> Option<usize> {
    let normalized = normalize_display_name(identifier);
    if normalized.is_empty() {
        return None;
    }
    if let Some(idx) =
        direct_match(roster, &normalized).or_else(|| reversed_match(roster, &normalized))
    {
        return Some(idx);
    }

    let stripped = strip_organization_suffix(&normalized);
    if stripped.is_empty() || stripped == normalized {
        return None;
    }
    direct_match(roster, &stripped).or_else(|| reversed_match(roster, &stripped))
}

/// Full-name equality ignoring case and accents, direct then reversed per member.
pub fn accent_insensitive_match(roster: &RosterIndex, identifier: &str) -> Option<usize> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }
    roster.members().iter().position(|m| {
        matches_without_accents(identifier, &m.full_name())
            || matches_without_accents(identifier, &m.reversed_name())
    })
}
