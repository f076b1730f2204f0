//! HTTP endpoints for the WhatsApp Cloud API webhook.
//!
//! `GET /webhook` answers the subscription handshake, `POST /webhook`
//! receives message events. POST always answers 200: anything else makes
//! the platform retry the delivery.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use chrono::Utc;
use log::debug;
use log::error;
use log::info;
use log::warn;
use serde::Deserialize;
use serde_json::json;

use crate::bot::controller::BotController;
use crate::messenger::Messenger;
use crate::service::inbox_service::InboxService;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct AppState {
    pub verify_token: Arc<String>,
    pub controller: Arc<BotController>,
    pub inbox: Arc<InboxService>,
    pub messenger: Arc<dyn Messenger>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebhookPayload {
    entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Change {
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChangeValue {
    messages: Vec<InboundMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InboundMessage {
    id: String,
    from: String,
    text: Option<TextContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextContent {
    body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Ignored,
    Duplicate,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Ignored => "ignored",
            Outcome::Duplicate => "duplicate",
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify).post(receive))
        .with_state(state)
}

/// Binds `addr` and serves the webhook until the process exits.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Webhook server listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn verify(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    if mode == Some("subscribe") && token == Some(state.verify_token.as_str()) {
        info!("Webhook verified.");
        let challenge = params.get("hub.challenge").cloned().unwrap_or_default();
        return (StatusCode::OK, challenge).into_response();
    }
    warn!("Webhook verification failed (mode {mode:?}).");
    (StatusCode::FORBIDDEN, "Verification failed").into_response()
}

async fn receive(State(state): State<AppState>, body: Bytes) -> Json<serde_json::Value> {
    let outcome = match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => handle_payload(&state, payload).await,
        Err(e) => {
            debug!("Ignoring unparsable webhook body: {e}");
            Outcome::Ignored
        }
    };
    Json(json!({ "status": outcome.as_str() }))
}

async fn handle_payload(state: &AppState, payload: WebhookPayload) -> Outcome {
    let messages = payload
        .entry
        .into_iter()
        .flat_map(|e| e.changes)
        .flat_map(|c| c.value.messages)
        .filter(|m| !m.from.is_empty() && m.text.is_some());

    let mut outcome = Outcome::Ignored;
    for message in messages {
        match handle_message(state, message).await {
            Outcome::Ok => outcome = Outcome::Ok,
            Outcome::Duplicate if outcome == Outcome::Ignored => outcome = Outcome::Duplicate,
            _ => {}
        }
    }
    outcome
}

async fn handle_message(state: &AppState, message: InboundMessage) -> Outcome {
    let now = Utc::now();
    if !message.id.is_empty() {
        match state.inbox.first_delivery(&message.id, now).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Dropping redelivered message {}.", message.id);
                return Outcome::Duplicate;
            }
            // Reply anyway.
            Err(e) => error!("Failed to record message {}: {e}", message.id),
        }
    }

    let text = message.text.map(|t| t.body).unwrap_or_default();
    let reply = state
        .controller
        .handle_message(&message.from, &text, now)
        .await;
    if let Err(e) = state.messenger.send_text(&message.from, &reply).await {
        error!("Failed to reply to {}: {e}", message.from);
    }
    Outcome::Ok
}
