//! boardbot GitHub - project board access over the GitHub REST API
//!
//! Implements [`boardbot_core::ProjectTracker`] against the repository
//! (classic) Projects API using octocrab.

mod client;
mod error;
mod projects;

pub use client::GitHubClient;
pub use error::{Error, Result};
