//! Replay a saved webhook delivery

use std::io::Read;
use std::path::PathBuf;

use boardbot_core::{AssignOutcome, Config, InboundEvent, Secrets, PULL_REQUEST_EVENT};
use clap::Args;

use super::build_assigner;

/// Run the handler once on a saved webhook payload
#[derive(Args, Debug)]
pub struct DispatchArgs {
    /// Event type, as sent in the X-GitHub-Event header
    #[arg(short, long, default_value = PULL_REQUEST_EVENT)]
    pub event: String,

    /// JSON payload file, or '-' for stdin
    pub payload: PathBuf,
}

impl DispatchArgs {
    /// Execute the dispatch command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let body = self.read_payload()?;
        let event = InboundEvent::from_webhook(&self.event, &body)?;

        let secrets = Secrets::load()?;
        let assigner = build_assigner(config, &secrets).await?;

        println!("{}", describe(&assigner.handle(&event).await));
        Ok(())
    }

    fn read_payload(&self) -> anyhow::Result<Vec<u8>> {
        if self.payload.as_os_str() == "-" {
            let mut body = Vec::new();
            std::io::stdin().read_to_end(&mut body)?;
            return Ok(body);
        }

        std::fs::read(&self.payload).map_err(|e| {
            anyhow::anyhow!("Failed to read payload {}: {}", self.payload.display(), e)
        })
    }
}

/// One-line summary of an outcome
pub fn describe(outcome: &AssignOutcome) -> String {
    match outcome {
        AssignOutcome::Skipped => "Event ignored".to_string(),
        AssignOutcome::Assigned { card, notified } => {
            let note = if *notified {
                "notification sent"
            } else {
                "notification failed"
            };
            format!("Created card {} ({}), {}", card.id, card.url, note)
        }
        AssignOutcome::Aborted(e) => format!("Not assigned: {}", e),
    }
}
