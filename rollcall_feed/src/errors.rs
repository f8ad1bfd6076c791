//! Error types for reading boundary documents.

use std::path::PathBuf;

/// Errors that can occur when loading a feed, roster, or session document.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON for the requested shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is not valid YAML for the requested shape.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
    /// The file extension does not map to a supported format.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}
