use thiserror::Error;

use addrforge_data::DataError;

use crate::city::LocateError;

/// Errors emitted by the generation engine.
///
/// The first three variants render as the fixed messages callers of the
/// string entry point receive instead of output.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Provide a valid count.")]
    InvalidCount,
    #[error("Invalid Country Name or data file not found.")]
    CatalogNotFound { country: String },
    #[error("Unsupported format. Use 'json', 'csv', or 'text'.")]
    UnsupportedFormat(String),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("location error: {0}")]
    Locate(#[from] LocateError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
