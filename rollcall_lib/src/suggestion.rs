//! Batch suggestion generation over unassigned records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::name_parser::NoiseFilter;
use crate::resolver::{IdentityResolver, MatchResult, MatchType, ResolverStats};
use crate::{RecordID, RosterMember, UnassignedRecord};

/// Confidence at or above which a suggestion counts as high confidence.
pub const HIGH_CONFIDENCE: f64 = 0.85;

/// Aggregate counts over a suggestion map, for summaries.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionStats {
    pub total: usize,
    pub name_based: usize,
    pub email_based: usize,
    pub high_confidence: usize,
    pub medium_confidence: usize,
}

impl SuggestionStats {
    pub fn from_suggestions(suggestions: &BTreeMap<RecordID, MatchResult>) -> Self {
        let mut stats = Self {
            total: suggestions.len(),
            ..Self::default()
        };
        for s in suggestions.values() {
            match s.match_type {
                MatchType::Name => stats.name_based += 1,
                MatchType::Email => stats.email_based += 1,
            }
            if s.confidence >= HIGH_CONFIDENCE {
                stats.high_confidence += 1;
            } else {
                stats.medium_confidence += 1;
            }
        }
        stats
    }
}

/// Fans unassigned records out to an [`IdentityResolver`].
pub struct SuggestionEngine {
    resolver: IdentityResolver,
}

impl SuggestionEngine {
    pub fn new(roster: Vec<RosterMember>) -> Self {
        Self {
            resolver: IdentityResolver::new(roster),
        }
    }

    pub fn with_noise_filter(roster: Vec<RosterMember>, filter: NoiseFilter) -> Self {
        Self {
            resolver: IdentityResolver::with_noise_filter(roster, filter),
        }
    }

    pub fn from_resolver(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    /// Map of record id to suggestion. Records without a suggestion are absent.
    /// Inputs are never modified, so repeated calls give the same map.
    pub fn generate_suggestions(
        &mut self,
        records: &[UnassignedRecord],
    ) -> BTreeMap<RecordID, MatchResult> {
        self.resolver.process_records(records)
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn resolver_statistics(&self) -> &ResolverStats {
        self.resolver.statistics()
    }
}

fn suggestion_rank(suggestion: Option<&MatchResult>) -> u8 {
    match suggestion.map(|s| s.match_type) {
        Some(MatchType::Name) => 0,
        Some(MatchType::Email) => 1,
        None => 2,
    }
}

/// Name-suggested records first, then email-suggested, then the rest. Order
/// within each group is preserved.
pub fn sort_records_by_suggestion_type(
    records: &[UnassignedRecord],
    suggestions: &BTreeMap<RecordID, MatchResult>,
) -> Vec<UnassignedRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| suggestion_rank(suggestions.get(&r.id)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Phase;

    fn roster() -> Vec<RosterMember> {
        vec![
            RosterMember::new(1, "Mario", "Rossi", ""),
            RosterMember::new(2, "Marco", "Bianchi", ""),
            RosterMember::new(3, "Anna", "Verdi", ""),
        ]
    }

    fn records() -> Vec<UnassignedRecord> {
        vec![
            UnassignedRecord::new(100, "Unknown Person"),
            UnassignedRecord::new(101, "m.bianchi@example.org"),
            UnassignedRecord::new(102, "Mario Rossi"),
            UnassignedRecord::new(103, "Verdi Anna"),
        ]
    }

    #[test]
    fn generates_suggestions() {
        let mut engine = SuggestionEngine::new(roster());
        let suggestions = engine.generate_suggestions(&records());
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[&101].member.id, 2);
        assert_eq!(suggestions[&101].phase, Phase::EmailPattern);
        assert_eq!(suggestions[&102].member.id, 1);
        assert_eq!(suggestions[&103].member.id, 3);
        assert!(!suggestions.contains_key(&100));
    }

    #[test]
    fn generation_is_idempotent() {
        let mut engine = SuggestionEngine::new(roster());
        let input = records();
        let first = engine.generate_suggestions(&input);
        let second = engine.generate_suggestions(&input);
        assert_eq!(first, second);
        assert_eq!(input, records());
        assert_eq!(engine.resolver_statistics().total_processed, 8);
    }

    #[test]
    fn stats_count_types_and_confidence() {
        let mut engine = SuggestionEngine::new(roster());
        let suggestions = engine.generate_suggestions(&records());
        let stats = SuggestionStats::from_suggestions(&suggestions);
        assert_eq!(
            stats,
            SuggestionStats {
                total: 3,
                name_based: 2,
                email_based: 1,
                high_confidence: 3,
                medium_confidence: 0,
            }
        );
    }

    #[test]
    fn stats_medium_confidence() {
        let mut suggestions = BTreeMap::new();
        suggestions.insert(
            1,
            MatchResult::new(RosterMember::new(1, "Mario", "Rossi", ""), Phase::ParsedVariants),
        );
        let stats = SuggestionStats::from_suggestions(&suggestions);
        assert_eq!(stats.high_confidence, 0);
        assert_eq!(stats.medium_confidence, 1);
    }

    #[test]
    fn sorts_name_then_email_then_none() {
        let mut engine = SuggestionEngine::new(roster());
        let input = records();
        let suggestions = engine.generate_suggestions(&input);
        let ids: Vec<RecordID> = sort_records_by_suggestion_type(&input, &suggestions)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![102, 103, 101, 100]);
    }
}
