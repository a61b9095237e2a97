//! Files newly opened pull requests on the review column of a project board
//!
//! The chain is strictly sequential: each remote call needs the id resolved
//! by the previous one. Any failure stops the chain, is logged with the ids
//! involved and is never returned to the dispatcher. Webhook redelivery is
//! the only retry.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::board::{find_board, find_column, Card, CardContentType};
use crate::event::{InboundEvent, PullRequestRef, PULL_REQUEST_EVENT};
use crate::ports::{ChatNotifier, ProjectTracker, TrackerError};

/// Pull request action that triggers assignment
pub const OPENED_ACTION: &str = "opened";

/// Where new pull requests go and who hears about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub board_name: String,
    pub review_column_name: String,
    pub notification_destination: String,
}

/// Why an assignment stopped
#[derive(Debug, Error)]
pub enum AssignError {
    #[error("Couldn't fetch the projects for repo {owner}/{repo}: {source}")]
    ListProjects {
        owner: String,
        repo: String,
        source: TrackerError,
    },

    #[error("Couldn't find project {board_name} in repo {owner}/{repo}")]
    BoardNotFound {
        board_name: String,
        owner: String,
        repo: String,
    },

    #[error("Couldn't fetch the columns for project {project_id} in repo {owner}/{repo}: {source}")]
    ListColumns {
        owner: String,
        repo: String,
        project_id: u64,
        source: TrackerError,
    },

    #[error("Couldn't find {column_name} column in project {board_name}")]
    ColumnNotFound {
        column_name: String,
        board_name: String,
    },

    #[error("Couldn't create project card in column {column_id} for pull request {pull_request_id}: {source}")]
    CreateCard {
        column_id: u64,
        pull_request_id: u64,
        source: TrackerError,
    },
}

impl AssignError {
    /// Short name of the step that failed
    pub fn step(&self) -> &'static str {
        match self {
            AssignError::ListProjects { .. } => "list_projects",
            AssignError::BoardNotFound { .. } => "find_board",
            AssignError::ListColumns { .. } => "list_columns",
            AssignError::ColumnNotFound { .. } => "find_column",
            AssignError::CreateCard { .. } => "create_card",
        }
    }
}

/// Terminal state of one invocation
#[derive(Debug)]
pub enum AssignOutcome {
    /// Event filtered out, nothing called
    Skipped,
    /// Card created. `notified` is false if the chat message could not be sent.
    Assigned { card: Card, notified: bool },
    /// Stopped at one step, nothing after it ran
    Aborted(AssignError),
}

impl AssignOutcome {
    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignOutcome::Assigned { .. })
    }
}

/// Whether an event should trigger an assignment
///
/// Only `pull_request` events with action `opened`, and never pull requests
/// the bot opened itself. Logins compare case-insensitively like GitHub does.
pub fn should_handle(event: &InboundEvent, bot_identity: &str) -> bool {
    let Some(pr) = &event.pull_request else {
        return false;
    };

    if pr.author_login.eq_ignore_ascii_case(bot_identity) {
        return false;
    }

    event.event_type == PULL_REQUEST_EVENT && event.action == OPENED_ACTION
}

/// Notification text posted after a card was created
pub fn assignment_message(config: &BoardConfig, pull_request_url: &str) -> String {
    format!(
        "Assigned PR to {} in {} project\n{}",
        config.review_column_name, config.board_name, pull_request_url
    )
}

/// Stateless handler; share it behind an `Arc` across concurrent deliveries
pub struct PullRequestReviewAssigner {
    tracker: Arc<dyn ProjectTracker>,
    notifier: Arc<dyn ChatNotifier>,
    config: BoardConfig,
    bot_identity: String,
}

impl PullRequestReviewAssigner {
    pub fn new(
        tracker: Arc<dyn ProjectTracker>,
        notifier: Arc<dyn ChatNotifier>,
        config: BoardConfig,
        bot_identity: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            notifier,
            config,
            bot_identity: bot_identity.into(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn bot_identity(&self) -> &str {
        &self.bot_identity
    }

    /// Filter the event, then assign it
    pub async fn handle(&self, event: &InboundEvent) -> AssignOutcome {
        if !should_handle(event, &self.bot_identity) {
            debug!(
                event_type = %event.event_type,
                action = %event.action,
                repo = %event.repository(),
                "Ignoring event"
            );
            return AssignOutcome::Skipped;
        }

        self.assign(event).await
    }

    /// Run the lookup/create/notify chain for an accepted event
    #[instrument(
        skip(self, event),
        fields(
            owner = %event.repository_owner,
            repo = %event.repository_name,
            pr = event.pull_request.as_ref().map(|pr| pr.number),
        )
    )]
    pub async fn assign(&self, event: &InboundEvent) -> AssignOutcome {
        let Some(pr) = &event.pull_request else {
            debug!("Event carries no pull request");
            return AssignOutcome::Skipped;
        };

        info!(
            "Handling pull request #{} on repo {}",
            pr.number,
            event.repository()
        );

        let card = match self.file_card(event, pr).await {
            Ok(card) => card,
            Err(e) => {
                error!(step = e.step(), error = %e, "Pull request not assigned");
                return AssignOutcome::Aborted(e);
            }
        };

        let text = assignment_message(&self.config, &pr.url);
        let notified = match self
            .notifier
            .send_message(&self.config.notification_destination, &text)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    room = %self.config.notification_destination,
                    error = %e,
                    "Couldn't post assignment notification"
                );
                false
            }
        };

        AssignOutcome::Assigned { card, notified }
    }

    async fn file_card(
        &self,
        event: &InboundEvent,
        pr: &PullRequestRef,
    ) -> Result<Card, AssignError> {
        let owner = &event.repository_owner;
        let repo = &event.repository_name;

        // TODO: cache project and column ids per repo; every event costs two lookups
        let boards = self
            .tracker
            .list_open_projects(owner, repo)
            .await
            .map_err(|source| AssignError::ListProjects {
                owner: owner.clone(),
                repo: repo.clone(),
                source,
            })?;

        let board = find_board(&boards, &self.config.board_name).ok_or_else(|| {
            AssignError::BoardNotFound {
                board_name: self.config.board_name.clone(),
                owner: owner.clone(),
                repo: repo.clone(),
            }
        })?;
        debug!(project = %board.name, project_id = board.id, "Fetched project");

        let columns = self
            .tracker
            .list_columns(board.id)
            .await
            .map_err(|source| AssignError::ListColumns {
                owner: owner.clone(),
                repo: repo.clone(),
                project_id: board.id,
                source,
            })?;

        let column = find_column(&columns, &self.config.review_column_name).ok_or_else(|| {
            AssignError::ColumnNotFound {
                column_name: self.config.review_column_name.clone(),
                board_name: board.name.clone(),
            }
        })?;
        debug!(column = %column.name, column_id = column.id, "Fetched column");

        let card = self
            .tracker
            .create_card(column.id, CardContentType::PullRequest, pr.id)
            .await
            .map_err(|source| AssignError::CreateCard {
                column_id: column.id,
                pull_request_id: pr.id,
                source,
            })?;
        debug!(card_id = card.id, card_url = %card.url, "Created card");

        Ok(card)
    }
}
