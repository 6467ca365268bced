//! Error types for the liftrank_core library.
//!
//! Missing benchmark data is not an error: lookups return `Option::None`
//! and aggregation skips the absent entry.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftrank_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input rejected at an engine boundary (non-positive reps, negative weight, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed benchmark table or configuration, fatal at load time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Rank snapshot state error
    #[error("State error: {0}")]
    State(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}
