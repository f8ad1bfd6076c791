//! Engine configuration loaded from TOML.
//!
//! ```toml
//! [session]
//! window_start = "2025-03-01T09:00:00Z"
//! window_end = 1740826800
//! required_attendance_percent = 75
//!
//! [noise]
//! titles = ["dott\\.?", "ing\\.?"]
//! ```
//!
//! Every section and key is optional. Missing noise lists keep the built-in defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attendance::SessionWindow;
use crate::name_parser::{NoiseFilter, NoiseFilterError, NoiseLists};
use crate::timestamp::parse_timestamp;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// A timestamp as written in TOML: epoch seconds or a date-time string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampValue {
    Seconds(i64),
    Text(String),
}

impl TimestampValue {
    fn resolve(&self, field: &str) -> Result<i64, ConfigError> {
        match self {
            Self::Seconds(s) => Ok(*s),
            Self::Text(text) => parse_timestamp(text).ok_or_else(|| {
                ConfigError::Validation(format!("{} is not a timestamp: '{}'", field, text))
            }),
        }
    }
}

/// `[session]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub window_start: Option<TimestampValue>,
    pub window_end: Option<TimestampValue>,
    pub required_attendance_percent: Option<u32>,
}

impl SessionSettings {
    pub fn window_start(&self) -> Result<Option<i64>, ConfigError> {
        self.window_start
            .as_ref()
            .map(|t| t.resolve("session.window_start"))
            .transpose()
    }

    pub fn window_end(&self) -> Result<Option<i64>, ConfigError> {
        self.window_end
            .as_ref()
            .map(|t| t.resolve("session.window_end"))
            .transpose()
    }

    /// The configured window when both ends are set.
    pub fn window(&self) -> Result<Option<SessionWindow>, ConfigError> {
        Ok(match (self.window_start()?, self.window_end()?) {
            (Some(start), Some(end)) => Some(SessionWindow::new(start, end)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub session: SessionSettings,
    pub noise: NoiseLists,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Timestamps must parse, the window must not be inverted, and the
    /// percentage must be within 0..=100.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(window) = self.session.window()? {
            if !window.is_valid() {
                return Err(ConfigError::Validation(format!(
                    "session window start {} is not before end {}",
                    window.start, window.end
                )));
            }
        }
        if let Some(p) = self.session.required_attendance_percent {
            if p > 100 {
                return Err(ConfigError::Validation(format!(
                    "required_attendance_percent must be 0-100, got {}",
                    p
                )));
            }
        }
        Ok(())
    }

    /// Compile the configured noise lists.
    pub fn noise_filter(&self) -> Result<NoiseFilter, NoiseFilterError> {
        NoiseFilter::new(&self.noise)
    }
}

/// Read and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = EngineConfig::from_toml_str(&content)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}
