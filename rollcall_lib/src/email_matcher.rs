//! Email local-part matching against roster name variants.
//!
//! Two steps. Full-name compositions ("rossi.mario", "mariorossi") are specific
//! enough to accept on first hit. Initial and single-name shapes ("m.rossi",
//! "rossi") are accepted only when exactly one roster member fits the shape.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::accent::fold;
use crate::roster::RosterIndex;
use crate::RosterMember;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
        r"@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?",
        r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    ))
    .expect("email regex compiles")
});

/// True when `s` is a syntactically valid email address.
pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

/// Accent-folded, lowercased, ASCII alphanumeric only.
fn alnum_clean(s: &str) -> String {
    fold(s).chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Cleaned local part and its separator-normalized spellings.
fn local_part_forms(local: &str) -> Vec<String> {
    let folded = fold(local);
    let mut forms = vec![
        alnum_clean(local),
        folded.replace(['.', '-', '_'], ""),
        folded.replace(['-', '_'], "."),
        folded.replace(['.', '_'], "-"),
        folded.replace(['.', '-'], "_"),
    ];
    forms.dedup();
    forms
}

/// Full-name compositions, in priority order.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExactPattern {
    LastFirst,
    LastDotFirst,
    LastUnderscoreFirst,
    FirstLast,
    FirstDotLast,
    FirstUnderscoreLast,
}

impl ExactPattern {
    pub const ALL: [ExactPattern; 6] = [
        Self::LastFirst,
        Self::LastDotFirst,
        Self::LastUnderscoreFirst,
        Self::FirstLast,
        Self::FirstDotLast,
        Self::FirstUnderscoreLast,
    ];

    pub fn compose(self, first: &str, last: &str) -> String {
        match self {
            Self::LastFirst => format!("{}{}", last, first),
            Self::LastDotFirst => format!("{}.{}", last, first),
            Self::LastUnderscoreFirst => format!("{}_{}", last, first),
            Self::FirstLast => format!("{}{}", first, last),
            Self::FirstDotLast => format!("{}.{}", first, last),
            Self::FirstUnderscoreLast => format!("{}_{}", first, last),
        }
    }
}

/// Initial and single-name shapes, in the order they are tried.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InitialShape {
    LastnameInitial,
    InitialLastname,
    LastnameOnly,
    FirstnameOnly,
}

static LASTNAME_INITIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)([a-z])$").expect("shape regex compiles"));
static INITIAL_LASTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z])([a-z]+)$").expect("shape regex compiles"));
static SINGLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)$").expect("shape regex compiles"));

impl InitialShape {
    pub const ALL: [InitialShape; 4] = [
        Self::LastnameInitial,
        Self::InitialLastname,
        Self::LastnameOnly,
        Self::FirstnameOnly,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            Self::LastnameInitial => &LASTNAME_INITIAL_RE,
            Self::InitialLastname => &INITIAL_LASTNAME_RE,
            Self::LastnameOnly | Self::FirstnameOnly => &SINGLE_NAME_RE,
        }
    }

    /// Does a cleaned `(first, last)` pair fit the captured groups?
    fn fits(self, groups: &(String, String), first: &str, last: &str) -> bool {
        let initial = first.chars().next().map(String::from).unwrap_or_default();
        match self {
            Self::LastnameInitial => groups.0 == last && groups.1 == initial,
            Self::InitialLastname => groups.0 == initial && groups.1 == last,
            Self::LastnameOnly => groups.0 == last,
            Self::FirstnameOnly => groups.0 == first,
        }
    }

    fn captures(self, local_clean: &str) -> Option<(String, String)> {
        let caps = self.regex().captures(local_clean)?;
        let g1 = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        let g2 = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        Some((g1, g2))
    }
}

/// One exact pattern evaluated against the local part.
#[derive(Serialize, Debug, Clone)]
pub struct PatternCheck {
    pub member_id: i64,
    pub member: String,
    pub pattern: ExactPattern,
    pub value: String,
    pub matches: bool,
}

/// One initial shape evaluated against the roster.
#[derive(Serialize, Debug, Clone)]
pub struct ShapeCheck {
    pub shape: InitialShape,
    pub syntactic_match: bool,
    pub candidate_ids: Vec<i64>,
}

/// Diagnostic breakdown of an email lookup.
#[derive(Serialize, Debug, Clone)]
pub struct EmailAnalysis {
    pub original: String,
    pub local_part: String,
    pub local_clean: String,
    pub exact_patterns_tested: Vec<PatternCheck>,
    pub initial_shapes_tested: Vec<ShapeCheck>,
    pub resolved: Option<RosterMember>,
}

/// Matches email addresses against a roster's precomputed name variants.
pub struct EmailPatternMatcher<'a> {
    roster: &'a RosterIndex,
}

impl<'a> EmailPatternMatcher<'a> {
    pub fn new(roster: &'a RosterIndex) -> Self {
        Self { roster }
    }

    /// Resolve an email to a roster member, or `None` when nothing fits or the
    /// only fitting shapes are shared by several members.
    pub fn find_match(&self, email: &str) -> Option<&'a RosterMember> {
        self.find_index(email).and_then(|i| self.roster.get(i))
    }

    /// Like [`find_match`](Self::find_match), returning the roster position.
    pub fn find_index(&self, email: &str) -> Option<usize> {
        let local = split_local_part(email)?;
        let forms = local_part_forms(&local);
        if let Some(idx) = self.exact_match(&forms) {
            return Some(idx);
        }
        self.initial_match(&forms[0])
    }

    /// `(index, cleaned first, cleaned last)` for every usable variant in roster order.
    fn cleaned_variants(&self) -> impl Iterator<Item = (usize, String, String)> + '_ {
        self.roster.iter().flat_map(|(idx, _, variants)| {
            variants.iter().filter_map(move |v| {
                let first = alnum_clean(&v.firstname);
                let last = alnum_clean(&v.lastname);
                if first.is_empty() || last.is_empty() {
                    None
                } else {
                    Some((idx, first, last))
                }
            })
        })
    }

    fn exact_match(&self, forms: &[String]) -> Option<usize> {
        for (idx, first, last) in self.cleaned_variants() {
            for pattern in ExactPattern::ALL {
                let value = pattern.compose(&first, &last);
                if forms.iter().any(|f| *f == value) {
                    tracing::debug!("Email matched member #{} via {:?}", idx, pattern);
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Members fitting a shape, each counted once.
    fn shape_candidates(&self, shape: InitialShape, groups: &(String, String)) -> Vec<usize> {
        let mut candidates: Vec<usize> = Vec::new();
        for (idx, first, last) in self.cleaned_variants() {
            if candidates.last() == Some(&idx) {
                continue;
            }
            if shape.fits(groups, &first, &last) {
                candidates.push(idx);
            }
        }
        candidates
    }

    fn initial_match(&self, local_clean: &str) -> Option<usize> {
        for shape in InitialShape::ALL {
            let Some(groups) = shape.captures(local_clean) else {
                continue;
            };
            let candidates = self.shape_candidates(shape, &groups);
            match candidates.as_slice() {
                [only] => return Some(*only),
                [] => {}
                _ => tracing::debug!(
                    "Multiple members fit {:?} for '{}' -- skipping",
                    shape,
                    local_clean
                ),
            }
        }
        None
    }

    /// Full diagnostic trace of a lookup. `None` when the address has no single '@'.
    pub fn analyze(&self, email: &str) -> Option<EmailAnalysis> {
        let local = split_local_part(email)?;
        let forms = local_part_forms(&local);

        let mut exact_patterns_tested = Vec::new();
        for (idx, first, last) in self.cleaned_variants() {
            let Some(member) = self.roster.get(idx) else {
                continue;
            };
            for pattern in ExactPattern::ALL {
                let value = pattern.compose(&first, &last);
                let matches = forms.iter().any(|f| *f == value);
                exact_patterns_tested.push(PatternCheck {
                    member_id: member.id,
                    member: member.full_name(),
                    pattern,
                    value,
                    matches,
                });
            }
        }

        let initial_shapes_tested = InitialShape::ALL
            .iter()
            .map(|&shape| match shape.captures(&forms[0]) {
                Some(groups) => ShapeCheck {
                    shape,
                    syntactic_match: true,
                    candidate_ids: self
                        .shape_candidates(shape, &groups)
                        .into_iter()
                        .filter_map(|i| self.roster.get(i).map(|m| m.id))
                        .collect(),
                },
                None => ShapeCheck {
                    shape,
                    syntactic_match: false,
                    candidate_ids: Vec::new(),
                },
            })
            .collect();

        Some(EmailAnalysis {
            original: email.to_string(),
            local_part: local,
            local_clean: forms[0].clone(),
            exact_patterns_tested,
            initial_shapes_tested,
            resolved: self.find_match(email).cloned(),
        })
    }
}

/// Lowercased local part of an address with exactly one '@'.
fn split_local_part(email: &str) -> Option<String> {
    let lowered = email.trim().to_lowercase();
    let mut parts = lowered.split('@');
    let local = parts.next()?;
    let _domain = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(local.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(members: &[(i64, &str, &str)]) -> RosterIndex {
        RosterIndex::new(
            members
                .iter()
                .map(|(id, f, l)| RosterMember::new(*id, f, l, ""))
                .collect(),
        )
    }

    #[test]
    fn is_email_accepts_addresses() {
        assert!(is_email("mario.rossi@example.org"));
        assert!(is_email("m_rossi+lab@sub.example.co.uk"));
        assert!(!is_email("Mario Rossi"));
        assert!(!is_email("mario@localhost"));
        assert!(!is_email("a@b@c.org"));
        assert!(!is_email(""));
    }

    #[test]
    fn local_part_requires_single_at() {
        assert_eq!(split_local_part("Mario.Rossi@Example.org"), Some("mario.rossi".to_string()));
        assert_eq!(split_local_part("no-at-sign"), None);
        assert_eq!(split_local_part("a@b@c"), None);
    }

    #[test]
    fn exact_lastname_firstname() {
        let index = roster(&[(1, "Mario", "Rossi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("rossimario@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn exact_with_separators() {
        let index = roster(&[(1, "Mario", "Rossi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("mario.rossi@x.com").map(|m| m.id), Some(1));
        assert_eq!(matcher.find_match("rossi_mario@x.com").map(|m| m.id), Some(1));
        assert_eq!(matcher.find_match("mario-rossi@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn exact_folds_accents() {
        let index = roster(&[(1, "Nicolò", "Bertè")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("nicolo.berte@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn exact_returns_first_member_in_roster_order() {
        let index = roster(&[(1, "Mario", "Rossi"), (2, "Mario", "Rossi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("mario.rossi@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn ambiguous_initial_rejected() {
        let index = roster(&[(1, "Andrea", "Rossi"), (2, "Alessia", "Rossi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert!(matcher.find_match("a.rossi@x.com").is_none());
    }

    #[test]
    fn unique_initial_accepted() {
        let index = roster(&[(1, "Marco", "Bianchi"), (2, "Anna", "Verdi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("m.bianchi@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn lastname_initial_accepted() {
        let index = roster(&[(1, "Marco", "Bianchi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("bianchim@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn lastname_only_needs_uniqueness() {
        let index = roster(&[(1, "Marco", "Bianchi"), (2, "Luca", "Bianchi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert!(matcher.find_match("bianchi@x.com").is_none());

        let index = roster(&[(1, "Marco", "Bianchi"), (2, "Luca", "Verdi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("bianchi@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn single_name_matches_either_field() {
        let index = roster(&[(1, "Marco", "Bianchi"), (2, "Luca", "Verdi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("luca@x.com").map(|m| m.id), Some(2));
    }

    #[test]
    fn member_counted_once_across_variants() {
        // both the original and the duplicate-stripped variant end in "deimann"
        let index = roster(&[(1, "Alberto Deimann", "Deimann")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert_eq!(matcher.find_match("deimann@x.com").map(|m| m.id), Some(1));
    }

    #[test]
    fn invalid_address_yields_nothing() {
        let index = roster(&[(1, "Marco", "Bianchi")]);
        let matcher = EmailPatternMatcher::new(&index);
        assert!(matcher.find_match("bianchi").is_none());
        assert!(matcher.analyze("bianchi").is_none());
    }

    #[test]
    fn analysis_lists_patterns_and_shapes() {
        let index = roster(&[(1, "Andrea", "Rossi"), (2, "Alessia", "Rossi")]);
        let matcher = EmailPatternMatcher::new(&index);
        let analysis = matcher.analyze("A.Rossi@x.com").unwrap();
        assert_eq!(analysis.local_part, "a.rossi");
        assert_eq!(analysis.local_clean, "arossi");
        // two members, two variants each, six patterns
        assert_eq!(analysis.exact_patterns_tested.len(), 24);
        assert!(analysis.exact_patterns_tested.iter().all(|c| !c.matches));
        let initial = &analysis.initial_shapes_tested[1];
        assert_eq!(initial.shape, InitialShape::InitialLastname);
        assert_eq!(initial.candidate_ids, vec![1, 2]);
        assert!(analysis.resolved.is_none());
    }
}
