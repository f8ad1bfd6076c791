//! Error types for the library layer.

use std::fmt;

use crate::config::ConfigError;
use crate::name_parser::NoiseFilterError;

/// Errors produced by the library layer. Data-quality problems (malformed
/// intervals, ambiguous identities) are not errors and never appear here.
#[derive(Debug)]
pub enum RollcallError {
    /// A boundary document could not be read or decoded.
    Feed(rollcall_feed::Error),
    /// The configuration file is unreadable or invalid.
    Config(ConfigError),
    /// An injected noise pattern is not a valid regular expression.
    NoiseFilter(NoiseFilterError),
    /// JSON serialization failed.
    Serialization(serde_json::Error),
    /// Caller-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for RollcallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feed(e) => write!(f, "Feed error: {}", e),
            Self::Config(e) => write!(f, "Config error: {}", e),
            Self::NoiseFilter(e) => write!(f, "Noise filter error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for RollcallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Feed(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::NoiseFilter(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<rollcall_feed::Error> for RollcallError {
    fn from(e: rollcall_feed::Error) -> Self {
        Self::Feed(e)
    }
}

impl From<ConfigError> for RollcallError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<NoiseFilterError> for RollcallError {
    fn from(e: NoiseFilterError) -> Self {
        Self::NoiseFilter(e)
    }
}

impl From<serde_json::Error> for RollcallError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
