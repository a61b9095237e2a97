//! Error types for Slack operations

use thiserror::Error;

/// Result type for Slack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to Slack
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or non-success HTTP status
    #[error("Slack HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered `ok: false`
    #[error("Slack API error: {0}")]
    Api(String),

    /// Missing or unusable token
    #[error("Slack authentication error: {0}")]
    Auth(String),

    /// Bad API URL
    #[error("Invalid Slack API URL: {0}")]
    Url(#[from] url::ParseError),
}
