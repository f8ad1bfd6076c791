//! Accent folding and Levenshtein similarity shared by every matching phase.
//!
//! The substitution table covers Italian vowels plus the common Western European
//! diacritics. Characters outside the table pass through unchanged.

/// Accented letter to base ASCII letter, both cases.
#[rustfmt::skip]
const ACCENT_MAP: &[(char, char)] = &[
    ('à', 'a'), ('á', 'a'), ('â', 'a'), ('ã', 'a'), ('ä', 'a'), ('å', 'a'),
    ('è', 'e'), ('é', 'e'), ('ê', 'e'), ('ë', 'e'),
    ('ì', 'i'), ('í', 'i'), ('î', 'i'), ('ï', 'i'),
    ('ò', 'o'), ('ó', 'o'), ('ô', 'o'), ('õ', 'o'), ('ö', 'o'),
    ('ù', 'u'), ('ú', 'u'), ('û', 'u'), ('ü', 'u'),
    ('ç', 'c'), ('ñ', 'n'),
    ('À', 'A'), ('Á', 'A'), ('Â', 'A'), ('Ã', 'A'), ('Ä', 'A'), ('Å', 'A'),
    ('È', 'E'), ('É', 'E'), ('Ê', 'E'), ('Ë', 'E'),
    ('Ì', 'I'), ('Í', 'I'), ('Î', 'I'), ('Ï', 'I'),
    ('Ò', 'O'), ('Ó', 'O'), ('Ô', 'O'), ('Õ', 'O'), ('Ö', 'O'),
    ('Ù', 'U'), ('Ú', 'U'), ('Û', 'U'), ('Ü', 'U'),
    ('Ç', 'C'), ('Ñ', 'N'),
];

fn fold_char(c: char) -> char {
    ACCENT_MAP
        .iter()
        .find(|(accented, _)| *accented == c)
        .map(|(_, base)| *base)
        .unwrap_or(c)
}

/// Replace every mapped accented letter with its base letter, keeping case.
pub fn normalize_accents(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Accent-free lowercase form used for every comparison.
pub fn fold(s: &str) -> String {
    normalize_accents(s).to_lowercase()
}

/// True when both strings are equal ignoring case and accents.
pub fn matches_without_accents(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

/// Levenshtein similarity in `[0, 1]` on the folded forms.
///
/// `1 - distance / max(len)`, with lengths counted in characters after folding.
/// Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = fold(a);
    let b = fold(b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(&a, &b);
    1.0 - (distance as f64 / max_len as f64)
}
