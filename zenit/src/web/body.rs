//! Request body capture.
//!
//! The transport hands us the body as a stream that can only be drained once,
//! but a delivery has to be read twice: once for the signature and once for
//! the payload. The body is buffered in full up front and every later reader
//! gets its own cursor over that buffer.

use std::io::Cursor;

use axum::body::{to_bytes, Body, Bytes};
use tracing::{error, info};

use crate::error::WebhookError;

/// A fully buffered request body.
#[derive(Debug, Clone)]
pub struct CapturedBody {
    bytes: Bytes,
}

impl CapturedBody {
    /// Wrap bytes that were already read in full.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The exact captured bytes, for hashing.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A fresh reader positioned at the start of the captured bytes.
    pub fn replay(&self) -> Cursor<Bytes> {
        Cursor::new(self.bytes.clone())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Drain `body` into memory, refusing bodies larger than `limit` bytes.
///
/// On failure nothing is returned, so a partial buffer can never reach the
/// verifier.
pub async fn capture_body(body: Body, limit: usize) -> Result<CapturedBody, WebhookError> {
    match to_bytes(body, limit).await {
        Ok(bytes) => {
            info!(body_length = bytes.len(), "webhook_body_captured");
            Ok(CapturedBody::new(bytes))
        }
        Err(e) => {
            error!(error = %e, limit = limit, "webhook_body_read_failed");
            Err(WebhookError::Transport(format!(
                "Failed to read request body: {}",
                e
            )))
        }
    }
}
