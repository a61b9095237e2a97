//! boardbot CLI - files new pull requests on a project board
//!
//! Runs the webhook receiver or replays a saved delivery through the same
//! handler.

mod commands;

use std::path::PathBuf;

use boardbot_core::{Config, Secrets};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{DispatchArgs, ServeArgs};

/// boardbot: puts newly opened pull requests on the review column
#[derive(Parser, Debug)]
#[command(name = "boardbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/boardbot/config.toml)
    #[arg(short, long, global = true, env = "BOARDBOT_CONFIG")]
    config: Option<PathBuf>,

    /// GitHub login of the bot (overrides config and env)
    #[arg(long, global = true)]
    bot_login: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Receive GitHub webhooks over HTTP
    Serve(ServeArgs),

    /// Run the handler once on a saved webhook payload
    #[command(visible_alias = "d")]
    Dispatch(DispatchArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template
    InitSecrets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Version) => {
            println!("boardbot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            let config = load_config(&cli, args.listen.clone())?;
            args.execute(&config).await?;
        }
        Some(Commands::Dispatch(args)) => {
            let config = load_config(&cli, None)?;
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            let config = load_config(&cli, None)?;
            let board = &config.new_pull_requests.project_board;
            println!("boardbot Configuration");
            println!("======================");
            println!();
            println!("Project board:");
            println!("  name: {}", board.name);
            println!("  review-column-name: {}", board.review_column_name);
            println!();
            println!("Notifications:");
            println!("  room: {}", or_unset(&config.slack.notification.room));
            println!("  slack api-url: {}", config.slack.api_url);
            println!();
            println!("GitHub:");
            println!("  api-url: {}", config.github.api_url);
            println!("  timeout: {:?}", config.github.timeout);
            println!(
                "  bot login: {}",
                config.bot.login.as_deref().unwrap_or("(resolved from token)")
            );
            println!();
            println!("Server:");
            println!("  listen: {}", config.server.listen);
            println!();
            let path = cli.config.clone().or_else(Config::default_config_path);
            if let Some(path) = path {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Created {}", path.display());
        }
        None => {
            println!("boardbot - files new pull requests on a project board");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// Config file plus env and command-line overrides
fn load_config(cli: &Cli, listen: Option<String>) -> anyhow::Result<Config> {
    Ok(Config::load_with_overrides(
        cli.config.as_deref(),
        cli.bot_login.clone(),
        listen,
    )?)
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn broken_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[new-pull-requests\nname = ").unwrap();
        file
    }

    fn cli_with(config: &NamedTempFile, command: &str) -> Cli {
        let path = config.path().to_str().unwrap();
        Cli::try_parse_from(["boardbot", "--config", path, command]).unwrap()
    }

    #[tokio::test]
    async fn test_version_ignores_broken_config() {
        let config = broken_config();
        assert!(run(cli_with(&config, "version")).await.is_ok());
    }

    #[tokio::test]
    async fn test_config_command_reports_broken_config() {
        let config = broken_config();
        assert!(run(cli_with(&config, "config")).await.is_err());
    }

    #[test]
    fn test_serve_listen_reaches_config() {
        let config = NamedTempFile::new().unwrap();
        let cli = Cli::try_parse_from([
            "boardbot",
            "--config",
            config.path().to_str().unwrap(),
            "serve",
            "--listen",
            "0.0.0.0:9000",
        ])
        .unwrap();

        let Some(Commands::Serve(args)) = &cli.command else {
            panic!("expected serve");
        };
        let loaded = load_config(&cli, args.listen.clone()).unwrap();
        assert_eq!(loaded.server.listen, "0.0.0.0:9000");
    }
}
