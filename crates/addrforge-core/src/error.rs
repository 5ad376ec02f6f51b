use thiserror::Error;

/// Core error type shared across addrforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog violates internal invariants.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    /// A tag or key could not be parsed.
    #[error("unknown {kind}: {value}")]
    UnknownTag { kind: &'static str, value: String },
}

/// Convenience alias for results returned by addrforge crates.
pub type Result<T> = std::result::Result<T, Error>;
