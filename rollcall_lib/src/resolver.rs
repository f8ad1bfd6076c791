//! Multi-phase identity resolution.
//!
//! An [`IdentityResolver`] walks an ordered list of [`MatchPhase`] strategies and
//! stops at the first one that accepts a candidate. "No match" is a normal
//! outcome and is returned as `None`, never as an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::cache::AmbiguityMemo;
use crate::name_parser::NoiseFilter;
use crate::phases::default_phases;
use crate::roster::RosterIndex;
use crate::{RecordID, RosterMember, UnassignedRecord};

/// Matching strategy, numbered in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    ExactName = 1,
    EmailPattern = 2,
    AccentInsensitive = 3,
    ParsedVariants = 4,
    StrictSimilarity = 5,
    SurnameFirst = 6,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Self::ExactName,
        Self::EmailPattern,
        Self::AccentInsensitive,
        Self::ParsedVariants,
        Self::StrictSimilarity,
        Self::SurnameFirst,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.number() == n)
    }

    /// Fixed confidence attached to a match accepted by this phase.
    pub fn confidence(self) -> f64 {
        match self {
            Self::ExactName => 0.95,
            Self::EmailPattern => 0.85,
            Self::AccentInsensitive => 0.90,
            Self::ParsedVariants => 0.80,
            Self::StrictSimilarity => 0.75,
            Self::SurnameFirst => 0.70,
        }
    }

    pub fn match_type(self) -> MatchType {
        match self {
            Self::EmailPattern => MatchType::Email,
            _ => MatchType::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ExactName => "exact name",
            Self::EmailPattern => "email pattern",
            Self::AccentInsensitive => "accent-insensitive name",
            Self::ParsedVariants => "parsed name variants",
            Self::StrictSimilarity => "strict similarity",
            Self::SurnameFirst => "surname first",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

/// Kind of evidence behind a match.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Name,
    Email,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// The resolver's answer for one raw identifier.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub member: RosterMember,
    pub phase: Phase,
    pub confidence: f64,
    pub match_type: MatchType,
}

impl MatchResult {
    pub fn new(member: RosterMember, phase: Phase) -> Self {
        Self {
            member,
            phase,
            confidence: phase.confidence(),
            match_type: phase.match_type(),
        }
    }
}

/// Shared, read-only inputs handed to every phase.
pub struct PhaseContext<'a> {
    pub roster: &'a RosterIndex,
    pub filter: &'a NoiseFilter,
    pub memo: &'a AmbiguityMemo,
}

/// One matching strategy.
pub trait MatchPhase: Send + Sync {
    fn phase(&self) -> Phase;

    /// Roster position of the accepted candidate, if any.
    fn try_match(&self, identifier: &str, ctx: &PhaseContext<'_>) -> Option<usize>;
}

/// Running counters, for observability only.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub total_processed: usize,
    pub matches_found: usize,
    /// Hits per phase number.
    pub phase_breakdown: BTreeMap<u8, usize>,
}

impl ResolverStats {
    fn record(&mut self, result: Option<&MatchResult>) {
        self.total_processed += 1;
        if let Some(m) = result {
            self.matches_found += 1;
            *self.phase_breakdown.entry(m.phase.number()).or_insert(0) += 1;
        }
    }
}

/// What one phase would have answered, for diagnostics.
#[derive(Serialize, Debug, Clone)]
pub struct PhaseOutcome {
    pub phase: Phase,
    pub strategy: &'static str,
    pub member: Option<RosterMember>,
}

/// Every phase evaluated on one identifier. `winner` is what resolution returns.
#[derive(Serialize, Debug, Clone)]
pub struct Explanation {
    pub identifier: String,
    pub outcomes: Vec<PhaseOutcome>,
    pub winner: Option<MatchResult>,
}

/// Resolves raw identifiers against one roster.
///
/// Owns its ambiguity memo; create one resolver per worker when resolving in
/// parallel.
pub struct IdentityResolver {
    roster: RosterIndex,
    filter: NoiseFilter,
    phases: Vec<Box<dyn MatchPhase>>,
    memo: AmbiguityMemo,
    stats: ResolverStats,
}

impl IdentityResolver {
    /// Resolver with the built-in noise lists and the standard six phases.
    pub fn new(roster: Vec<RosterMember>) -> Self {
        Self::with_noise_filter(roster, NoiseFilter::default())
    }

    pub fn with_noise_filter(roster: Vec<RosterMember>, filter: NoiseFilter) -> Self {
        Self::with_phases(roster, filter, default_phases())
    }

    /// Resolver with a custom phase list, evaluated in the given order.
    pub fn with_phases(
        roster: Vec<RosterMember>,
        filter: NoiseFilter,
        phases: Vec<Box<dyn MatchPhase>>,
    ) -> Self {
        Self {
            roster: RosterIndex::new(roster),
            filter,
            phases,
            memo: AmbiguityMemo::new(),
            stats: ResolverStats::default(),
        }
    }

    pub fn roster(&self) -> &RosterIndex {
        &self.roster
    }

    pub fn noise_filter(&self) -> &NoiseFilter {
        &self.filter
    }

    fn context<'a>(&'a self, memo: &'a AmbiguityMemo) -> PhaseContext<'a> {
        PhaseContext {
            roster: &self.roster,
            filter: &self.filter,
            memo,
        }
    }

    /// First accepted match over the phase list, or `None`. Identifiers that
    /// clean down to nothing but an organizational phrase never reach a phase.
    pub fn find_best_match(&self, identifier: &str) -> Option<MatchResult> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }
        if self.filter.is_organization_only(identifier) {
            tracing::debug!("'{}' is an organization, not a person", identifier);
            return None;
        }
        let ctx = self.context(&self.memo);

        for phase in &self.phases {
            if let Some(idx) = phase.try_match(identifier, &ctx) {
                let member = self.roster.get(idx)?.clone();
                let result = MatchResult::new(member, phase.phase());
                tracing::debug!(
                    "Phase {} matched '{}' to member {} (confidence {:.2})",
                    result.phase,
                    identifier,
                    result.member.id,
                    result.confidence
                );
                return Some(result);
            }
        }
        None
    }

    /// Resolve a batch of records. Clears the ambiguity memo first and updates
    /// the running statistics. Unmatched records are absent from the map.
    pub fn process_records(
        &mut self,
        records: &[UnassignedRecord],
    ) -> BTreeMap<RecordID, MatchResult> {
        self.memo.reset();
        let mut suggestions = BTreeMap::new();

        for record in records {
            let result = self.find_best_match(&record.name);
            self.stats.record(result.as_ref());
            if let Some(m) = result {
                suggestions.insert(record.id, m);
            }
        }

        tracing::info!(
            "Resolved {}/{} records (phases: {:?})",
            suggestions.len(),
            records.len(),
            self.stats.phase_breakdown
        );
        suggestions
    }

    pub fn statistics(&self) -> &ResolverStats {
        &self.stats
    }

    /// Clear the memo and the running statistics.
    pub fn reset(&mut self) {
        self.memo.reset();
        self.stats = ResolverStats::default();
    }

    /// Evaluate every phase independently. Uses a private memo so diagnostics
    /// never influence later resolution. Organization-only identifiers report
    /// no candidate at any phase.
    pub fn explain(&self, identifier: &str) -> Explanation {
        let trimmed = identifier.trim();
        let resolvable = !trimmed.is_empty() && !self.filter.is_organization_only(trimmed);
        let memo = AmbiguityMemo::new();
        let ctx = self.context(&memo);

        let outcomes: Vec<PhaseOutcome> = self
            .phases
            .iter()
            .map(|phase| PhaseOutcome {
                phase: phase.phase(),
                strategy: phase.phase().label(),
                member: if resolvable {
                    phase
                        .try_match(trimmed, &ctx)
                        .and_then(|idx| self.roster.get(idx).cloned())
                } else {
                    None
                },
            })
            .collect();

        let winner = outcomes
            .iter()
            .find_map(|o| o.member.clone().map(|m| MatchResult::new(m, o.phase)));

        Explanation {
            identifier: trimmed.to_string(),
            outcomes,
            winner,
        }
    }
}
