//! Per-request error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that end a webhook request early.
///
/// Every variant is recovered into a response; none of them terminates the
/// process.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature missing, malformed or mismatched.
    #[error("Unacceptable X-Hub-Signature HTTP header")]
    Authentication,

    /// Event type header missing or not one we handle.
    #[error("Unsupported event in the X-Github-Event HTTP header")]
    UnsupportedEvent,

    /// Payload failed to parse or lacks a required field.
    #[error("Invalid payload: {0}")]
    Validation(String),

    /// Body unreadable or an outbound call failed.
    #[error("{0}")]
    Transport(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Authentication => StatusCode::FORBIDDEN,
            WebhookError::UnsupportedEvent | WebhookError::Validation(_) => StatusCode::BAD_REQUEST,
            WebhookError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(WebhookError::Authentication.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(WebhookError::UnsupportedEvent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            WebhookError::Validation("missing field".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::Transport("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            WebhookError::Authentication.to_string(),
            "Unacceptable X-Hub-Signature HTTP header"
        );
        assert_eq!(
            WebhookError::Validation("missing field `pusher`".into()).to_string(),
            "Invalid payload: missing field `pusher`"
        );
    }
}
