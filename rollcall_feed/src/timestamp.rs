//! Timestamp parsing for feed documents.
//!
//! Meeting providers report join/leave times either as epoch seconds or as
//! date-time strings. Everything is normalized to integer epoch seconds (UTC).

use chrono::{DateTime, NaiveDateTime};
use serde::{de::IgnoredAny, Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Seconds(i64),
    Fractional(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawTimestamp {
    fn into_seconds(self) -> Option<i64> {
        match self {
            Self::Seconds(s) => Some(s),
            Self::Fractional(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Fractional(_) => None,
            Self::Text(text) => parse_timestamp(&text),
            Self::Other(_) => None,
        }
    }
}

/// Parse a textual timestamp into epoch seconds.
///
/// Accepts a bare integer, RFC 3339 (`2025-03-01T09:00:00Z`, with offset), or a
/// naive `YYYY-MM-DD HH:MM:SS` interpreted as UTC. Returns `None` otherwise.
pub fn parse_timestamp(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Some(seconds);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc().timestamp())
}

/// Serde helper for optional feed timestamps. Unparseable values become `None`
/// so that a malformed interval is dropped instead of failing the document.
pub mod lenient {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
        Ok(raw.and_then(RawTimestamp::into_seconds))
    }
}

/// Serde helper for required timestamps (session configuration).
pub mod strict {
    use super::*;
    use serde::de::Error as _;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawTimestamp::deserialize(deserializer)?
            .into_seconds()
            .ok_or_else(|| D::Error::custom("expected epoch seconds or an RFC 3339 timestamp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_text() {
        assert_eq!(parse_timestamp("1700000000"), Some(1_700_000_000));
    }

    #[test]
    fn parses_rfc3339_utc() {
        assert_eq!(parse_timestamp("1970-01-01T00:01:40Z"), Some(100));
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00"), Some(0));
    }

    #[test]
    fn parses_naive_as_utc() {
        assert_eq!(parse_timestamp("1970-01-02 00:00:00"), Some(86_400));
        assert_eq!(parse_timestamp("1970-01-02T00:00:00"), Some(86_400));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("   "), None);
    }
}
