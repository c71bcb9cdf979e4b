//! Web server module for receiving GitHub webhooks.
//!
//! This module provides a thin web server that:
//! - Captures each delivery body exactly once
//! - Verifies the HMAC signature against the captured bytes
//! - Dispatches on the event type and answers in plain text

pub mod body;
pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use body::{capture_body, CapturedBody};
pub use handlers::{github_webhook, health, index, AppState, HealthResponse};
pub use signature::{
    select_signature_header, signature_tag, verify_signature, SignatureAlgorithm,
    SIGNATURE_256_HEADER, SIGNATURE_HEADER,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/handle", post(github_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
