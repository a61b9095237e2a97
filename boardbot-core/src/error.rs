//! Error types for boardbot

use thiserror::Error;

/// Result type alias for boardbot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for boardbot operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Webhook payload did not have the expected shape
    #[error("Invalid webhook payload: {0}")]
    Parse(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
