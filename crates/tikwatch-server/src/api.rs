//! HTTP surface: liveness probe and the Telegram webhook.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use tikwatch_notify::Notifier;
use tikwatch_profile::ProfileClient;

use crate::commands::{handle_update, Update};

/// Shared state for the HTTP handlers. Everything is `Arc`-wrapped and safe
/// for concurrent use; the profile client and notifier hold no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub profile: Arc<ProfileClient>,
    pub notifier: Arc<Notifier>,
    /// The token Telegram must present in the webhook path.
    pub webhook_token: Arc<String>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/webhook/{token}", post(webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe for external pingers; no dependencies, always 200.
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Telegram webhook endpoint.
///
/// The bot token in the path is the shared secret: a mismatch is answered
/// with 404. Once the token matches, this always answers 200 — Telegram
/// re-delivers updates on any other status, and a processing failure is not
/// something a re-delivery would fix.
async fn webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(update): Json<Update>,
) -> StatusCode {
    if token != *state.webhook_token {
        tracing::warn!("webhook called with a non-matching token");
        return StatusCode::NOT_FOUND;
    }

    if let Err(err) = handle_update(&state, update).await {
        tracing::error!(error = %err, "failed to process webhook update");
    }
    StatusCode::OK
}
