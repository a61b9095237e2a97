//! boardbot core - pull request triage onto project boards
//!
//! This crate holds the domain side of boardbot: webhook event parsing, the
//! board entities, the traits the GitHub and Slack adapters implement, and
//! the [`PullRequestReviewAssigner`] handler. It performs no I/O of its own
//! beyond reading configuration files.

pub mod assigner;
pub mod board;
pub mod config;
pub mod error;
pub mod event;
pub mod ports;
pub mod secrets;

pub use assigner::{
    assignment_message, should_handle, AssignError, AssignOutcome, BoardConfig,
    PullRequestReviewAssigner, OPENED_ACTION,
};
pub use board::{BoardColumn, Card, CardContentType, ProjectBoard};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{InboundEvent, PullRequestRef, PULL_REQUEST_EVENT};
pub use ports::{ChatNotifier, NotifyError, ProjectTracker, TrackerError};
pub use secrets::Secrets;
