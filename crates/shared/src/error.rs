//! Error types for Trellis
//!
//! The access-control engine itself never fails. Errors only surface at the
//! edges: reading and parsing policy documents.

use std::path::PathBuf;
use thiserror::Error;

/// Error thrown when a policy file has an extension we cannot parse
#[derive(Debug, Error)]
#[error("Unsupported policy format for '{}'. Expected one of: {}", path.display(), supported.join(", "))]
pub struct UnsupportedFormatError {
    pub path: PathBuf,
    pub supported: Vec<String>,
}

/// General Trellis error type
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TrellisError>;
