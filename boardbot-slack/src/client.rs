//! Slack Web API client

use async_trait::async_trait;
use boardbot_core::config::SlackConfig;
use boardbot_core::{ChatNotifier, NotifyError, Secrets};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts messages with a bot token via `chat.postMessage`
pub struct SlackClient {
    http: reqwest::Client,
    api_url: Url,
    token: String,
}

impl SlackClient {
    pub fn new(token: String, config: &SlackConfig) -> Result<Self> {
        let mut base = config.api_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_url = Url::parse(&base)?;

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        debug!(api_url = %api_url, "Created Slack client");

        Ok(Self {
            http,
            api_url,
            token,
        })
    }

    /// Create a client with the token from secrets
    ///
    /// Priority: SLACK_BOT_TOKEN environment variable > secrets file
    pub fn from_secrets(secrets: &Secrets, config: &SlackConfig) -> Result<Self> {
        let token = secrets.slack_token().ok_or_else(|| {
            Error::Auth(
                "Slack token not found. Set SLACK_BOT_TOKEN environment variable \
                 or add token to ~/.config/boardbot/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::new(token, config)
    }

    /// Post a plain-text message to a channel
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        let url = self.api_url.join("chat.postMessage")?;

        let response: ApiResponse = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&PostMessage { channel, text })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(Error::Api(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        info!(channel, "Posted Slack message");
        Ok(())
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatNotifier for SlackClient {
    async fn send_message(&self, destination: &str, text: &str) -> std::result::Result<(), NotifyError> {
        self.post_message(destination, text)
            .await
            .map_err(NotifyError::from_source)
    }
}
