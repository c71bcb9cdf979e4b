//! HTTP endpoint handlers.
//!
//! The webhook handler only captures the body and hands the delivery to the
//! [`Dispatcher`]; everything else is a thin wrapper.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::HeaderMap,
    response::Html,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::dispatch::{Dispatcher, InboundRequest};
use crate::error::WebhookError;
use crate::events::EVENT_HEADER;
use crate::github::StatusPublisher;
use crate::web::body::capture_body;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: Config, publisher: Option<Arc<dyn StatusPublisher>>) -> Self {
        let dispatcher = Dispatcher::new(&config, publisher);
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

// =============================================================================
// Index and Health
// =============================================================================

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>zenit</title></head>
<body>
<h1>zenit</h1>
<p>GitHub webhooks are received at <code>POST /handle</code>.</p>
</body>
</html>
"#;

/// Static index page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// GitHub Webhook
// =============================================================================

/// GitHub webhook endpoint.
///
/// This endpoint:
/// 1. Rejects unknown `X-Github-Event` values without reading the body
/// 2. Captures the raw body once
/// 3. Verifies the signature and runs the event handler
/// 4. Returns a plain-text acknowledgement or error
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<String, WebhookError> {
    let event = headers
        .get(EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    info!(
        event = ?event,
        delivery = ?headers.get("X-GitHub-Delivery").and_then(|v| v.to_str().ok()),
        "github_webhook_received"
    );

    let kind = Dispatcher::event_kind(event.as_deref())?;
    let body = capture_body(body, state.config.max_body_bytes).await?;

    let request = InboundRequest::new(headers, body);
    let response = state.dispatcher.handle(kind, &request).await?;

    info!(event = ?event, "github_webhook_handled");

    Ok(response)
}
