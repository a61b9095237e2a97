//! GitHub API client using octocrab

use crate::{Error, Result};
use boardbot_core::config::GitHubConfig;
use boardbot_core::Secrets;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use tracing::{debug, info};

/// GitHub API client for project board operations
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Create a client authenticated with a token
    ///
    /// Requests are attempted once: octocrab's retry middleware is disabled so
    /// a failed step is reported instead of silently repeated.
    pub fn new(token: String, config: &GitHubConfig) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token)
            .base_uri(config.api_url.as_str())
            .map_err(|e| Error::Other(format!("Invalid GitHub API URL {}: {}", config.api_url, e)))?
            .set_connect_timeout(Some(config.timeout))
            .set_read_timeout(Some(config.timeout))
            .add_retry_config(RetryConfig::None)
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(api_url = %config.api_url, "Created GitHub client");

        Ok(Self { client })
    }

    /// Create a client with the token from secrets
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN environment variable
    /// 2. ~/.config/boardbot/secrets.toml
    pub fn from_secrets(secrets: &Secrets, config: &GitHubConfig) -> Result<Self> {
        let token = secrets.github_token().ok_or_else(|| {
            Error::Auth(
                "GitHub token not found. Set GITHUB_TOKEN environment variable \
                 or add token to ~/.config/boardbot/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::new(token, config)
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Login of the account the token belongs to
    ///
    /// Used as the bot identity when none is configured.
    pub async fn authenticated_login(&self) -> Result<String> {
        debug!("Resolving authenticated user");

        let user = self
            .client
            .current()
            .user()
            .await
            .map_err(|e| Error::for_resource(e, "authenticated user"))?;

        info!(login = %user.login, "GitHub connection successful");
        Ok(user.login)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> GitHubConfig {
        GitHubConfig {
            api_url: server.uri(),
            ..GitHubConfig::default()
        }
    }

    #[test]
    fn test_rejects_invalid_api_url() {
        let config = GitHubConfig {
            api_url: "not a url".to_string(),
            ..GitHubConfig::default()
        };
        assert!(GitHubClient::new("t".to_string(), &config).is_err());
    }

    #[tokio::test]
    async fn test_authenticated_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "status-bot",
                "id": 11,
                "node_id": "MDQ6VXNlcjE=",
                "avatar_url": "https://avatars.githubusercontent.com/u/11",
                "gravatar_id": "",
                "url": "https://api.github.com/users/status-bot",
                "html_url": "https://github.com/status-bot",
                "followers_url": "https://api.github.com/users/status-bot/followers",
                "following_url": "https://api.github.com/users/status-bot/following{/other_user}",
                "gists_url": "https://api.github.com/users/status-bot/gists{/gist_id}",
                "starred_url": "https://api.github.com/users/status-bot/starred{/owner}{/repo}",
                "subscriptions_url": "https://api.github.com/users/status-bot/subscriptions",
                "organizations_url": "https://api.github.com/users/status-bot/orgs",
                "repos_url": "https://api.github.com/users/status-bot/repos",
                "events_url": "https://api.github.com/users/status-bot/events{/privacy}",
                "received_events_url": "https://api.github.com/users/status-bot/received_events",
                "type": "User",
                "site_admin": false
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token".to_string(), &test_config(&server)).unwrap();
        assert_eq!(client.authenticated_login().await.unwrap(), "status-bot");
    }
}
