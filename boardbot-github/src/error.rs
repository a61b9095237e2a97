//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Repository or project does not exist or is not visible to the token
    #[error("{0} not found or not accessible")]
    NotFound(String),

    /// Projects are turned off in the repository settings
    #[error("Projects are disabled for repository {0}")]
    ProjectsDisabled(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map an octocrab error, naming the resource it was about
    pub(crate) fn for_resource(err: octocrab::Error, resource: impl Into<String>) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } if source.message.contains("Not Found") => {
                Error::NotFound(resource.into())
            }
            octocrab::Error::GitHub { source, .. } if source.message.contains("disabled") => {
                Error::ProjectsDisabled(resource.into())
            }
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("Bad credentials") =>
            {
                Error::Auth("Invalid GitHub token".to_string())
            }
            _ => Error::Api(err),
        }
    }
}
