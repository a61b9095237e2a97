//! GitHub webhook receiver
//!
//! Verifies and parses deliveries, answers GitHub right away and runs the
//! assigner on a background task. Tasks still running at shutdown are
//! awaited before the process exits.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use boardbot_core::{should_handle, Config, InboundEvent, PullRequestReviewAssigner, Secrets};
use clap::Args;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::build_assigner;

/// Receive GitHub webhooks over HTTP
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides config and env)
    #[arg(short, long)]
    pub listen: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let webhook_secret = secrets.webhook_secret();
        if webhook_secret.is_none() {
            warn!("No webhook secret configured; deliveries will not be verified");
        }

        let assigner = build_assigner(config, &secrets).await?;
        let state = Arc::new(WebhookState::new(Arc::new(assigner), webhook_secret));

        let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
        info!(listen = %config.server.listen, "Listening for GitHub webhooks");

        axum::serve(listener, router(state.clone()))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        state.wait_for_assignments().await;
        info!("Webhook receiver stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Webhook handler state
pub struct WebhookState {
    pub assigner: Arc<PullRequestReviewAssigner>,
    /// GitHub webhook secret for HMAC verification
    pub webhook_secret: Option<String>,
    /// Assignments accepted with 202 and not yet joined
    assignments: Mutex<JoinSet<()>>,
}

impl WebhookState {
    pub fn new(assigner: Arc<PullRequestReviewAssigner>, webhook_secret: Option<String>) -> Self {
        Self {
            assigner,
            webhook_secret,
            assignments: Mutex::new(JoinSet::new()),
        }
    }

    fn spawn_assignment(&self, event: InboundEvent) {
        let assigner = self.assigner.clone();
        let mut tasks = self
            .assignments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // reap finished tasks so the set only holds in-flight work
        while let Some(result) = tasks.try_join_next() {
            log_join_result(result);
        }

        tasks.spawn(async move {
            assigner.assign(&event).await;
        });
    }

    /// Wait for every accepted assignment to finish
    pub async fn wait_for_assignments(&self) {
        let mut tasks = std::mem::take(
            &mut *self
                .assignments
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        if !tasks.is_empty() {
            info!(pending = tasks.len(), "Waiting for in-flight assignments");
        }
        while let Some(result) = tasks.join_next().await {
            log_join_result(result);
        }
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Assignment task failed");
    }
}

/// Webhook response
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
    pub message: String,
}

type Reply = (StatusCode, Json<WebhookResponse>);

fn reply(code: StatusCode, status: &str, message: impl Into<String>) -> Reply {
    (
        code,
        Json(WebhookResponse {
            status: status.to_string(),
            message: message.into(),
        }),
    )
}

pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/webhooks/github", post(github_webhook_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// GitHub webhook handler
async fn github_webhook_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let event_type = match headers.get("x-github-event").map(|v| v.to_str()) {
        Some(Ok(v)) => v.to_string(),
        Some(Err(_)) => {
            warn!("Invalid X-GitHub-Event header");
            return reply(StatusCode::BAD_REQUEST, "error", "Invalid X-GitHub-Event header");
        }
        None => {
            warn!("Missing X-GitHub-Event header");
            return reply(StatusCode::BAD_REQUEST, "error", "Missing X-GitHub-Event header");
        }
    };

    let delivery_id = headers
        .get("x-github-delivery")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    debug!(event_type = %event_type, delivery_id = %delivery_id, "Received GitHub webhook");

    if let Some(secret) = &state.webhook_secret {
        let Some(signature) = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
        else {
            warn!(delivery_id = %delivery_id, "Missing X-Hub-Signature-256 header");
            return reply(StatusCode::UNAUTHORIZED, "error", "Missing signature");
        };

        if !verify_signature(secret, &body, signature) {
            error!(delivery_id = %delivery_id, "Invalid webhook signature");
            return reply(StatusCode::UNAUTHORIZED, "error", "Invalid signature");
        }
    }

    if event_type == "ping" {
        return reply(StatusCode::OK, "ok", "pong");
    }

    let event = match InboundEvent::from_webhook(&event_type, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Failed to parse webhook payload");
            return reply(StatusCode::BAD_REQUEST, "error", e.to_string());
        }
    };

    if !should_handle(&event, state.assigner.bot_identity()) {
        debug!(delivery_id = %delivery_id, action = %event.action, "Event ignored");
        return reply(StatusCode::OK, "ignored", "Event not handled");
    }

    info!(
        delivery_id = %delivery_id,
        repo = %event.repository(),
        "Pull request opened, assigning"
    );

    state.spawn_assignment(event);

    reply(StatusCode::ACCEPTED, "ok", "Webhook accepted")
}

/// Verify GitHub webhook signature using HMAC-SHA256
///
/// GitHub sends the signature in the format: "sha256=<hex-encoded-hmac>"
fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let Some(signature) = signature.strip_prefix("sha256=") else {
        warn!("Signature doesn't start with 'sha256='");
        return false;
    };

    let expected = match hex::decode(signature) {
        Ok(sig) => sig,
        Err(e) => {
            warn!(error = %e, "Failed to decode signature hex");
            return false;
        }
    };

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Failed to create HMAC");
            return false;
        }
    };
    mac.update(payload);

    mac.verify_slice(&expected).is_ok()
}
