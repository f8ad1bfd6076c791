//! Identifier cleaning and name decomposition.
//!
//! Raw meeting identifiers carry titles, office names, and device tags
//! ("Dott. Giulia Bianchi - Comune di Lodi"), and roster data carries import
//! anomalies (surname repeated inside the given-name field, inverted fields).
//! Instead of guessing one canonical shape, this module produces every plausible
//! `(firstname, lastname)` decomposition and lets the matching phases try them all.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::email_matcher::is_email;
use crate::RosterMember;

/// Error types for noise-filter construction.
#[derive(Error, Debug)]
pub enum NoiseFilterError {
    #[error("Invalid {list} pattern '{pattern}': {source}")]
    InvalidPattern {
        list: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Professional titles stripped as whole-word prefixes or suffixes.
/// Entries are regular-expression fragments.
pub const DEFAULT_TITLES: &[&str] = &[
    r"dott\.?",
    r"dr\.?",
    r"arch\.?",
    r"ing\.?",
    r"geom\.?",
    r"avv\.?",
    r"prof\.?",
    r"c\.te",
    "sindaco",
    "mayor",
    "presidente",
    "direttore",
];

/// Organizational phrases removed wherever they appear, up to the next separator.
///
/// The acronym patterns (`aipo`, `utc`, `uclam`, `cm `) are not anchored to a word
/// boundary, so they also fire inside words: "Anna Hutchinson" cleans to "anna h".
/// Supply a custom `[noise]` list to change this.
pub const DEFAULT_ORGANIZATIONS: &[&str] = &[
    r"comune di [^,\-\n]+",
    r"comune [^,\-\n]+",
    r"provincia di [^,\-\n]+",
    r"provincia [^,\-\n]+",
    r"aipo[^,\-\n]*",
    r"utc[^,\-\n]*",
    r"ufficiotecnico[^,\-\n]*",
    r"ufficio tecnico[^,\-\n]*",
    r"protezione civile[^,\-\n]*",
    r"prot\. civile[^,\-\n]*",
    r"polizia locale[^,\-\n]*",
    r"p\.l\.[^,\-\n]*",
    r"cm [^,\-\n]*",
    r"comunità montana[^,\-\n]*",
    r"uclam[^,\-\n]*",
];

/// Generic words that never identify a person.
pub const DEFAULT_GENERIC_WORDS: &[&str] = &[
    "guest",
    "meeting",
    "tecnico",
    "comunale",
    "sindaco",
    "presidente",
    "user",
    "utente",
    "partecipante",
    "participant",
];

fn to_owned_list(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_titles() -> Vec<String> {
    to_owned_list(DEFAULT_TITLES)
}

fn default_organizations() -> Vec<String> {
    to_owned_list(DEFAULT_ORGANIZATIONS)
}

fn default_generic_words() -> Vec<String> {
    to_owned_list(DEFAULT_GENERIC_WORDS)
}

/// Noise vocabulary used by the identifier cleaner.
///
/// Defaults reproduce the built-in Italian lists; a config file may replace any
/// of the three lists independently.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NoiseLists {
    #[serde(default = "default_titles")]
    pub titles: Vec<String>,
    #[serde(default = "default_organizations")]
    pub organizations: Vec<String>,
    #[serde(default = "default_generic_words")]
    pub generic_words: Vec<String>,
}

impl Default for NoiseLists {
    fn default() -> Self {
        Self {
            titles: default_titles(),
            organizations: default_organizations(),
            generic_words: default_generic_words(),
        }
    }
}

/// Where a name variant came from. Diagnostic only, never used for scoring.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VariantSource {
    // roster-side
    Original,
    Inverted,
    DuplicatedLastnameRemoved,
    FirstWordOnly,
    IdenticalFields,
    LastnameDeduplicated,
    CompoundLastnameFirst,
    // identifier-side
    CommaSeparated,
    FirstLast,
    LastFirst,
    CompoundFirst,
    CompoundLast,
    MiddleName,
}

impl std::fmt::Display for VariantSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Original => "original",
            Self::Inverted => "inverted",
            Self::DuplicatedLastnameRemoved => "duplicated_lastname_removed",
            Self::FirstWordOnly => "first_word_only",
            Self::IdenticalFields => "identical_fields",
            Self::LastnameDeduplicated => "lastname_deduplicated",
            Self::CompoundLastnameFirst => "compound_lastname_first",
            Self::CommaSeparated => "comma_separated",
            Self::FirstLast => "first_last",
            Self::LastFirst => "last_first",
            Self::CompoundFirst => "compound_first",
            Self::CompoundLast => "compound_last",
            Self::MiddleName => "middle_name",
        };
        write!(f, "{}", label)
    }
}

/// One candidate decomposition of a person's name.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NameVariant {
    pub firstname: String,
    pub lastname: String,
    pub source: VariantSource,
}

impl NameVariant {
    pub fn new(firstname: &str, lastname: &str, source: VariantSource) -> Self {
        Self {
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            source,
        }
    }
}

/// Result of cleaning a raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedIdentifier {
    /// Lowercased text with noise removed; empty for emails and pure noise.
    pub text: String,
    /// At least one organizational phrase was removed.
    pub organization_stripped: bool,
}

/// Compiled noise vocabulary.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    titles: Vec<(Regex, Regex)>,
    organizations: Vec<Regex>,
    generic_words: Vec<Regex>,
    separators: Regex,
    whitespace: Regex,
    fallback_separators: Regex,
}

fn compile(list: &'static str, pattern: String) -> Result<Regex, NoiseFilterError> {
    Regex::new(&pattern).map_err(|source| {
        tracing::warn!("Rejecting {} pattern '{}': {}", list, pattern, source);
        NoiseFilterError::InvalidPattern {
            list,
            pattern,
            source,
        }
    })
}

impl NoiseFilter {
    /// Compile a noise vocabulary. Fails on the first invalid pattern.
    pub fn new(lists: &NoiseLists) -> Result<Self, NoiseFilterError> {
        let titles = lists
            .titles
            .iter()
            .map(|t| {
                Ok((
                    compile("title", format!(r"(?i)\b{}\s+", t))?,
                    compile("title", format!(r"(?i)\s+{}\b", t))?,
                ))
            })
            .collect::<Result<Vec<_>, NoiseFilterError>>()?;
        let organizations = lists
            .organizations
            .iter()
            .map(|o| compile("organization", format!("(?i){}", o)))
            .collect::<Result<Vec<_>, _>>()?;
        let generic_words = lists
            .generic_words
            .iter()
            .map(|w| compile("generic word", format!(r"(?i)\b{}\b", w)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            titles,
            organizations,
            generic_words,
            separators: compile("separator", r"[,\-()_.;|]+".to_string())?,
            whitespace: compile("whitespace", r"\s+".to_string())?,
            fallback_separators: compile("separator", r"[,;|]+".to_string())?,
        })
    }

    /// Strip titles, organizations, separators, and generic words from a raw identifier.
    ///
    /// Emails are not names: they come back empty and are handled by the email matcher.
    pub fn clean(&self, raw: &str) -> CleanedIdentifier {
        if is_email(raw.trim()) {
            return CleanedIdentifier {
                text: String::new(),
                organization_stripped: false,
            };
        }

        let mut cleaned = raw.trim().to_lowercase();

        for (prefix, suffix) in &self.titles {
            cleaned = prefix.replace_all(&cleaned, "").into_owned();
            cleaned = suffix.replace_all(&cleaned, "").into_owned();
        }

        let mut organization_stripped = false;
        for org in &self.organizations {
            if org.is_match(&cleaned) {
                organization_stripped = true;
                cleaned = org.replace_all(&cleaned, "").into_owned();
            }
        }

        cleaned = self.separators.replace_all(&cleaned, " ").into_owned();

        for word in &self.generic_words {
            cleaned = word.replace_all(&cleaned, "").into_owned();
        }

        let text = self.whitespace.replace_all(&cleaned, " ").trim().to_string();
        CleanedIdentifier {
            text,
            organization_stripped,
        }
    }

    /// True when cleaning removed an organizational phrase and nothing else
    /// remains. Such identifiers never name a person.
    pub fn is_organization_only(&self, raw: &str) -> bool {
        let cleaned = self.clean(raw);
        cleaned.organization_stripped && cleaned.text.is_empty()
    }

    /// Punctuation-normalized copy of the raw text, used when cleaning removes everything.
    fn fallback(&self, raw: &str) -> String {
        let spaced = self.fallback_separators.replace_all(raw, " ");
        self.whitespace.replace_all(spaced.trim(), " ").trim().to_string()
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        // The built-in lists are known-good patterns.
        Self::new(&NoiseLists::default()).expect("default noise lists compile")
    }
}

/// Clean a raw identifier with the given noise filter. Returns an empty string for
/// emails and for identifiers made only of noise.
pub fn clean_identifier(raw: &str, filter: &NoiseFilter) -> String {
    filter.clean(raw).text
}

/// Trim fields, drop variants with a field shorter than two characters, and
/// remove case-insensitive duplicates keeping the first occurrence.
fn filter_valid_names(variants: Vec<NameVariant>) -> Vec<NameVariant> {
    let mut seen = HashSet::new();
    variants
        .into_iter()
        .filter_map(|v| {
            let firstname = v.firstname.trim();
            let lastname = v.lastname.trim();
            if firstname.chars().count() < 2 || lastname.chars().count() < 2 {
                return None;
            }
            let key = format!("{}|{}", firstname.to_lowercase(), lastname.to_lowercase());
            if !seen.insert(key) {
                return None;
            }
            Some(NameVariant::new(firstname, lastname, v.source))
        })
        .collect()
}

/// Decompose a free-text identifier into candidate name variants.
///
/// Order: comma-separated ("Last, First", from the uncleaned input), first/last,
/// last/first, then for three or more tokens compound first name, compound last
/// name, and first-two-tokens. Identifiers that consist only of organizational
/// phrases yield no variants.
pub fn parse_free_text_name(raw: &str, filter: &NoiseFilter) -> Vec<NameVariant> {
    let cleaned = filter.clean(raw);
    let text = if !cleaned.text.is_empty() {
        cleaned.text
    } else if cleaned.organization_stripped {
        return Vec::new();
    } else {
        filter.fallback(raw)
    };

    let parts: Vec<&str> = text
        .split_whitespace()
        .filter(|p| p.chars().count() >= 2)
        .collect();
    if parts.len() < 2 {
        return Vec::new();
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    let mut names = Vec::new();

    if raw.contains(',') {
        let comma_parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if comma_parts[0].chars().count() >= 2 && comma_parts[1].chars().count() >= 2 {
            names.push(NameVariant::new(
                comma_parts[1],
                comma_parts[0],
                VariantSource::CommaSeparated,
            ));
        }
    }

    names.push(NameVariant::new(first, last, VariantSource::FirstLast));
    names.push(NameVariant::new(last, first, VariantSource::LastFirst));

    if parts.len() > 2 {
        names.push(NameVariant::new(
            &format!("{} {}", parts[0], parts[1]),
            last,
            VariantSource::CompoundFirst,
        ));
        names.push(NameVariant::new(
            first,
            &parts[1..].join(" "),
            VariantSource::CompoundLast,
        ));
        names.push(NameVariant::new(parts[0], parts[1], VariantSource::MiddleName));
    }

    filter_valid_names(names)
}

/// Decompose a roster member's stored name into candidate variants, covering
/// inverted fields, a surname duplicated into the given-name field, identical
/// fields, and compound or duplicated surnames.
pub fn parse_roster_name(member: &RosterMember) -> Vec<NameVariant> {
    let firstname = member.firstname.trim();
    let lastname = member.lastname.trim();
    let mut variants = vec![NameVariant::new(firstname, lastname, VariantSource::Original)];

    if !firstname.is_empty() && !lastname.is_empty() {
        variants.push(NameVariant::new(lastname, firstname, VariantSource::Inverted));
    }

    let first_parts: Vec<&str> = firstname.split_whitespace().collect();
    let last_parts: Vec<&str> = lastname.split_whitespace().collect();

    // "Alberto Deimann" / "Deimann"
    if first_parts.len() >= 2 {
        let tail = first_parts[first_parts.len() - 1];
        if tail.to_lowercase() == lastname.to_lowercase() {
            variants.push(NameVariant::new(
                &first_parts[..first_parts.len() - 1].join(" "),
                lastname,
                VariantSource::DuplicatedLastnameRemoved,
            ));
        }
        variants.push(NameVariant::new(
            first_parts[0],
            lastname,
            VariantSource::FirstWordOnly,
        ));
    }

    // "Mario Rossi" / "Mario Rossi"
    if first_parts.len() >= 2
        && last_parts.len() >= 2
        && firstname.to_lowercase() == lastname.to_lowercase()
    {
        variants.push(NameVariant::new(
            first_parts[0],
            first_parts[1],
            VariantSource::IdenticalFields,
        ));
    }

    // "De Luca De Luca" or "Rossi Bianchi"
    if last_parts.len() >= 2 {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = last_parts
            .iter()
            .copied()
            .filter(|p| seen.insert(p.to_lowercase()))
            .collect();
        if unique.len() < last_parts.len() {
            variants.push(NameVariant::new(
                firstname,
                &unique.join(" "),
                VariantSource::LastnameDeduplicated,
            ));
        }
        variants.push(NameVariant::new(
            firstname,
            last_parts[0],
            VariantSource::CompoundLastnameFirst,
        ));
    }

    filter_valid_names(variants)
}

/// Summary of how an input was decomposed, for diagnostics.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ParsingStats {
    pub input_type: &'static str,
    pub total_variations: usize,
    pub sources_used: Vec<VariantSource>,
    pub variations: Vec<NameVariant>,
}

impl ParsingStats {
    fn from_variants(input_type: &'static str, variations: Vec<NameVariant>) -> Self {
        let mut sources_used = Vec::new();
        for v in &variations {
            if !sources_used.contains(&v.source) {
                sources_used.push(v.source);
            }
        }
        Self {
            input_type,
            total_variations: variations.len(),
            sources_used,
            variations,
        }
    }
}

/// Parsing statistics for a free-text identifier.
pub fn identifier_parsing_stats(raw: &str, filter: &NoiseFilter) -> ParsingStats {
    ParsingStats::from_variants("identifier", parse_free_text_name(raw, filter))
}

/// Parsing statistics for a roster member.
pub fn member_parsing_stats(member: &RosterMember) -> ParsingStats {
    ParsingStats::from_variants("roster_member", parse_roster_name(member))
}
