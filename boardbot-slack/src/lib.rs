//! boardbot Slack - chat notifications through the Slack Web API

mod client;
mod error;

pub use client::SlackClient;
pub use error::{Error, Result};
