//! CLI command implementations

pub mod dispatch;
pub mod serve;

use std::sync::Arc;

use boardbot_core::{Config, PullRequestReviewAssigner, Secrets};
use boardbot_github::GitHubClient;
use boardbot_slack::SlackClient;

pub use dispatch::DispatchArgs;
pub use serve::ServeArgs;

/// Wire the GitHub and Slack clients into an assigner
///
/// The bot identity comes from config, or from the GitHub token's own login.
pub async fn build_assigner(
    config: &Config,
    secrets: &Secrets,
) -> anyhow::Result<PullRequestReviewAssigner> {
    let board = config.board_config()?;
    let github = GitHubClient::from_secrets(secrets, &config.github)?;
    let slack = SlackClient::from_secrets(secrets, &config.slack)?;

    let bot_login = match config.bot.login.as_deref() {
        Some(login) if !login.trim().is_empty() => login.trim().to_string(),
        _ => github.authenticated_login().await?,
    };

    tracing::info!(
        board = %board.board_name,
        column = %board.review_column_name,
        room = %board.notification_destination,
        bot = %bot_login,
        "Assigner ready"
    );

    Ok(PullRequestReviewAssigner::new(
        Arc::new(github),
        Arc::new(slack),
        board,
        bot_login,
    ))
}
