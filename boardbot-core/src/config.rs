//! Configuration management for boardbot
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (BOARDBOT_*)
//! 3. Config file (~/.config/boardbot/config.toml)
//! 4. Default values
//!
//! Keys are kebab-case so existing bot configs carry over unchanged:
//!
//! ```toml
//! [new-pull-requests.project-board]
//! name = "Pipeline for QA"
//! review-column-name = "REVIEW"
//!
//! [slack.notification]
//! room = "core"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assigner::BoardConfig;
use crate::{Error, Result};

/// Project board the new pull requests are filed on
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectBoardConfig {
    /// Name of the repository project board
    pub name: String,

    /// Column on that board where new pull requests land
    pub review_column_name: String,
}

impl Default for ProjectBoardConfig {
    fn default() -> Self {
        Self {
            name: "Pipeline for QA".to_string(),
            review_column_name: "REVIEW".to_string(),
        }
    }
}

/// `[new-pull-requests]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NewPullRequestsConfig {
    pub project_board: ProjectBoardConfig,
}

/// Where success notifications are posted
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SlackNotificationConfig {
    /// Channel name or id
    pub room: String,
}

/// Slack API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SlackConfig {
    /// Base URL of the Slack Web API
    pub api_url: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    pub notification: SlackNotificationConfig,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_url: "https://slack.com/api/".to_string(),
            timeout: Duration::from_secs(10),
            notification: SlackNotificationConfig::default(),
        }
    }
}

/// GitHub API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Base URL of the GitHub REST API (GitHub Enterprise uses `https://host/api/v3`)
    pub api_url: String,

    /// Connect and read timeout for API calls
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Identity of the bot itself
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// GitHub login the bot acts as. Resolved from the token when unset.
    pub login: Option<String>,
}

/// Webhook receiver settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub new_pull_requests: NewPullRequestsConfig,
    pub slack: SlackConfig,
    pub github: GitHubConfig,
    pub bot: BotConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/boardbot/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("boardbot").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - BOARDBOT_BOARD_NAME: Project board name
    /// - BOARDBOT_REVIEW_COLUMN: Review column name
    /// - BOARDBOT_NOTIFICATION_ROOM: Slack room for notifications
    /// - BOARDBOT_BOT_LOGIN: GitHub login of the bot
    /// - BOARDBOT_LISTEN: Webhook receiver bind address
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let board = &mut self.new_pull_requests.project_board;
        if let Some(name) = lookup("BOARDBOT_BOARD_NAME") {
            board.name = name;
        }
        if let Some(column) = lookup("BOARDBOT_REVIEW_COLUMN") {
            board.review_column_name = column;
        }
        if let Some(room) = lookup("BOARDBOT_NOTIFICATION_ROOM") {
            self.slack.notification.room = room;
        }
        if let Some(login) = lookup("BOARDBOT_BOT_LOGIN") {
            self.bot.login = Some(login);
        }
        if let Some(listen) = lookup("BOARDBOT_LISTEN") {
            self.server.listen = listen;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, bot_login: Option<String>, listen: Option<String>) -> Self {
        if let Some(login) = bot_login {
            self.bot.login = Some(login);
        }

        if let Some(addr) = listen {
            self.server.listen = addr;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        path: Option<&Path>,
        bot_login: Option<String>,
        listen: Option<String>,
    ) -> Result<Self> {
        let base = match path {
            Some(p) => Self::load_from_file(p)?,
            None => Self::load()?,
        };

        Ok(base
            .with_env_overrides()
            .with_cli_overrides(bot_login, listen))
    }

    /// Settings the assigner needs, validated
    pub fn board_config(&self) -> Result<BoardConfig> {
        let board = &self.new_pull_requests.project_board;
        let room = &self.slack.notification.room;

        for (key, value) in [
            ("new-pull-requests.project-board.name", &board.name),
            (
                "new-pull-requests.project-board.review-column-name",
                &board.review_column_name,
            ),
            ("slack.notification.room", room),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", key)));
            }
        }

        Ok(BoardConfig {
            board_name: board.name.clone(),
            review_column_name: board.review_column_name.clone(),
            notification_destination: room.clone(),
        })
    }
}
