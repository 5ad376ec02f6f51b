use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while loading reference data.
#[derive(Debug, Error)]
pub enum DataError {
    /// No dataset exists for the requested key.
    #[error("dataset not found: {0}")]
    NotFound(String),
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    InvalidCatalog(#[from] addrforge_core::Error),
    #[error("cache error: {0}")]
    Cache(String),
}

impl DataError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound(_))
    }
}

/// Result type for reference data operations.
pub type Result<T> = std::result::Result<T, DataError>;
