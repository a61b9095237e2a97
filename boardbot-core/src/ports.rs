//! Traits implemented by the GitHub and Slack adapters

use async_trait::async_trait;
use thiserror::Error;

use crate::board::{BoardColumn, Card, CardContentType, ProjectBoard};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a project tracker call (transport or API)
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TrackerError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TrackerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an adapter error, keeping its message
    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// Failure to deliver a chat message
#[derive(Debug, Error)]
#[error("{message}")]
pub struct NotifyError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// Issue/project tracker holding the boards
#[async_trait]
pub trait ProjectTracker: Send + Sync {
    /// Open project boards of a repository
    async fn list_open_projects(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<ProjectBoard>, TrackerError>;

    /// Columns of a project board, in board order
    async fn list_columns(&self, project_id: u64) -> Result<Vec<BoardColumn>, TrackerError>;

    /// Create a card in a column linking existing content
    async fn create_card(
        &self,
        column_id: u64,
        content_type: CardContentType,
        content_id: u64,
    ) -> Result<Card, TrackerError>;
}

/// Chat system receiving notifications
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_message(&self, destination: &str, text: &str) -> Result<(), NotifyError>;
}
