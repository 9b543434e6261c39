//! Error types for the foresight crate

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum ForesightError {
    /// Malformed input: missing field, unparsable date, empty dataset
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reference to a model name or job id that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Durable-store I/O failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// The fitting procedure itself failed
    #[error("Training error: {0}")]
    Training(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for ForesightError {
    fn from(e: std::io::Error) -> Self {
        ForesightError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ForesightError>;
