//! File loader for boundary documents (participation feeds, rosters, records).

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::Error;

/// Serialization format of a boundary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parses a document from an in-memory string.
pub fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: DocumentFormat,
) -> Result<T, Error> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(content)?),
        DocumentFormat::Yaml => Ok(serde_yml::from_str(content)?),
    }
}

/// Reads and parses a document, choosing JSON or YAML from the file extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let format = DocumentFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Loaded {} bytes from {}", content.len(), path.display());
    parse_document(&content, format)
}
