//! Error types for gridlock-core.
//!
//! Only configuration loading can fail with an `Err`; per-request operations
//! embed their error state in the result objects instead of raising.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for gridlock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Knowledge-document loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Document missing at the expected location
    #[error("Knowledge document not found at {path}")]
    NotFound { path: PathBuf },

    /// Failed to read the document
    #[error("Failed to read knowledge document at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No required section could be located in the document at all
    #[error("Knowledge document is malformed: {0}")]
    Malformed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
