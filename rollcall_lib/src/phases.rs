//! The six matching strategies, from strict to loose.
//!
//! Each phase returns the roster position of an accepted candidate or `None`.
//! Gated phases return `None` whenever more than one candidate qualifies.

use crate::accent::similarity;
use crate::display_matcher::{accent_insensitive_match, exact_name_match};
use crate::email_matcher::{is_email, EmailPatternMatcher};
use crate::name_parser::parse_free_text_name;
use crate::resolver::{MatchPhase, Phase, PhaseContext};

/// Parsed-variant acceptance threshold.
pub const VARIANT_THRESHOLD: f64 = 0.8;
/// Strict re-scoring threshold.
pub const STRICT_THRESHOLD: f64 = 0.9;
/// Per-word threshold for the surname-first heuristic.
pub const SURNAME_FIRST_THRESHOLD: f64 = 0.85;

/// Phase 1: exact direct, reversed, or suffix-stripped display name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactNamePhase;

impl MatchPhase for ExactNamePhase {
    fn phase(&self) -> Phase {
        Phase::ExactName
    }

    fn try_match(&self, identifier: &str, ctx: &PhaseContext<'_>) -> Option<usize> {
        exact_name_match(ctx.roster, identifier)
    }
}

/// Phase 2: email local-part patterns. Skipped for non-email identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmailPatternPhase;

impl MatchPhase for EmailPatternPhase {
    fn phase(&self) -> Phase {
        Phase::EmailPattern
    }

    fn try_match(&self, identifier: &str, ctx: &PhaseContext<'_>) -> Option<usize> {
        if !is_email(identifier) {
            return None;
        }
        EmailPatternMatcher::new(ctx.roster).find_index(identifier)
    }
}

/// Phase 3: full-name equality ignoring accents and case.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccentInsensitivePhase;

impl MatchPhase for AccentInsensitivePhase {
    fn phase(&self) -> Phase {
        Phase::AccentInsensitive
    }

    fn try_match(&self, identifier: &str, ctx: &PhaseContext<'_>) -> Option<usize> {
        accent_insensitive_match(ctx.roster, identifier)
    }
}

/// Phase 4: parsed identifier variants scored against every member.
///
/// A (variant, member) pair qualifies when the mean of first-name and last-name
/// similarity exceeds [`VARIANT_THRESHOLD`]. Accepted only when exactly one pair
/// qualifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParsedVariantPhase;

impl MatchPhase for ParsedVariantPhase {
    fn phase(&self) -> Phase {
        Phase::ParsedVariants
    }

    fn try_match(&self, identifier: &str, ctx: &PhaseContext<'_>) -> Option<usize> {
        let variants = parse_free_text_name(identifier, ctx.filter);
        if variants.is_empty() {
            return None;
        }

        let mut qualifying = Vec::new();
        for variant in &variants {
            for (idx, member) in ctx.roster.members().iter().enumerate() {
                let score = (similarity(&variant.firstname, &member.firstname)
                    + similarity(&variant.lastname, &member.lastname))
                    / 2.0;
                if score > VARIANT_THRESHOLD {
                    qualifying.push(idx);
                }
            }
        }

        match qualifying.as_slice() {
            [only] => Some(*only),
            [] => None,
            _ => {
                tracing::debug!(
                    "Multiple variant matches ({}) for '{}' -- skipping",
                    qualifying.len(),
                    identifier
                );
                None
            }
        }
    }
}

/// Highest similarity of `identifier` against a member's name patterns.
fn strict_score(identifier: &str, firstname: &str, lastname: &str) -> f64 {
    [
        format!("{} {}", firstname, lastname),
        format!("{} {}", lastname, firstname),
        firstname.to_string(),
        lastname.to_string(),
    ]
    .iter()
    .map(|p| similarity(identifier, p))
    .fold(0.0, f64::max)
}

/// Phase 5: strict re-scoring, accepted only when exactly one member exceeds
/// [`STRICT_THRESHOLD`]. The outcome is memoized per identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictSimilarityPhase;

impl MatchPhase for StrictSimilarityPhase {
    fn phase(&self) -> Phase {
        Phase::StrictSimilarity
    }

    fn try_match(&self, identifier: &str, ctx: &PhaseContext<'_>) -> Option<usize> {
        ctx.memo.get_or_compute(identifier, || {
            let qualifying: Vec<usize> = ctx
                .roster
                .members()
                .iter()
                .enumerate()
                .filter(|(_, m)| {
                    strict_score(identifier, &m.firstname, &m.lastname) > STRICT_THRESHOLD
                })
                .map(|(idx, _)| idx)
                .collect();
            match qualifying.as_slice() {
                [only] => Some(*only),
                [] => None,
                _ => {
                    tracing::debug!(
                        "Multiple strict matches ({}) for '{}' -- skipping",
                        qualifying.len(),
                        identifier
                    );
                    None
                }
            }
        })
    }
}

/// Phase 6: word 0 as surname and word 1 as given name; the first member
/// scoring above [`SURNAME_FIRST_THRESHOLD`] on both wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct SurnameFirstPhase;

impl MatchPhase for SurnameFirstPhase {
    fn phase(&self) -> Phase {
        Phase::SurnameFirst
    }

    fn try_match(&self, identifier: &str, ctx: &PhaseContext<'_>) -> Option<usize> {
        let words: Vec<&str> = identifier.split_whitespace().collect();
        let [lastname, firstname, ..] = words.as_slice() else {
            return None;
        };
        ctx.roster.members().iter().position(|m| {
            similarity(lastname, &m.lastname) > SURNAME_FIRST_THRESHOLD
                && similarity(firstname, &m.firstname) > SURNAME_FIRST_THRESHOLD
        })
    }
}

/// The standard phase list, in evaluation order.
pub fn default_phases() -> Vec<Box<dyn MatchPhase>> {
    vec![
        Box::new(ExactNamePhase),
        Box::new(EmailPatternPhase),
        Box::new(AccentInsensitivePhase),
        Box::new(ParsedVariantPhase),
        Box::new(StrictSimilarityPhase),
        Box::new(SurnameFirstPhase),
    ]
}
