//! Inbound repository events

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Event type of pull request lifecycle deliveries (`X-GitHub-Event` header)
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Pull request identity as carried by a webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Global id, used as card content id
    pub id: u64,
    /// Per-repository number
    pub number: u64,
    /// Browser URL of the pull request
    pub url: String,
    /// Login of the user who opened it
    pub author_login: String,
}

/// A repository event delivered by the webhook source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub event_type: String,
    pub action: String,
    pub repository_owner: String,
    pub repository_name: String,
    /// Present only for pull request events
    pub pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    action: Option<String>,
    repository: Option<RawRepository>,
    pull_request: Option<RawPullRequest>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
    owner: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    id: u64,
    number: u64,
    html_url: String,
    user: RawUser,
}

impl InboundEvent {
    /// Build an event from the `X-GitHub-Event` header value and the JSON body
    pub fn from_webhook(event_type: &str, body: &[u8]) -> Result<Self> {
        let raw: RawPayload = serde_json::from_slice(body)?;

        let repository = raw
            .repository
            .ok_or_else(|| Error::Parse("missing repository".to_string()))?;

        Ok(Self {
            event_type: event_type.to_string(),
            action: raw.action.unwrap_or_default(),
            repository_owner: repository.owner.login,
            repository_name: repository.name,
            pull_request: raw.pull_request.map(|pr| PullRequestRef {
                id: pr.id,
                number: pr.number,
                url: pr.html_url,
                author_login: pr.user.login,
            }),
        })
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.repository_owner, self.repository_name)
    }
}
