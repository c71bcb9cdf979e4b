//! Event dispatch.
//!
//! ```text
//! Received ──unknown event──▶ Rejected (400)
//!    │
//!    ├──bad signature──▶ Rejected (403)
//!    ▼
//! Authenticated ──bad payload──▶ Rejected (400)
//!    │
//!    ▼
//! Handled (200)
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{error, info, warn};

use crate::error::WebhookError;
use crate::events::{EventKind, PushEvent};
use crate::github::{CommitStatus, StatusPublisher, StatusState};
use crate::web::body::CapturedBody;
use crate::web::signature::{select_signature_header, verify_signature};
use crate::Config;

/// A delivery whose body has already been captured.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub headers: HeaderMap,
    pub body: CapturedBody,
}

impl InboundRequest {
    pub fn new(headers: HeaderMap, body: CapturedBody) -> Self {
        Self { headers, body }
    }
}

/// Selects and runs the handler for a delivery.
///
/// Holds only read-only configuration, so one instance serves every request.
pub struct Dispatcher {
    secret: Vec<u8>,
    publisher: Option<Arc<dyn StatusPublisher>>,
    status_target_url: String,
    status_context: String,
}

impl Dispatcher {
    pub fn new(config: &Config, publisher: Option<Arc<dyn StatusPublisher>>) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            publisher,
            status_target_url: config.status_target_url.clone(),
            status_context: config.status_context.clone(),
        }
    }

    /// Handle one delivery and produce the plain-text response body.
    pub async fn dispatch(
        &self,
        event_type: Option<&str>,
        request: &InboundRequest,
    ) -> Result<String, WebhookError> {
        let kind = Self::event_kind(event_type)?;
        self.handle(kind, request).await
    }

    /// Resolve the event type header to a registered handler.
    ///
    /// Needs nothing but the header, so callers can reject unknown events
    /// before reading the body.
    pub fn event_kind(event_type: Option<&str>) -> Result<EventKind, WebhookError> {
        match event_type.map(str::parse::<EventKind>) {
            Some(Ok(kind)) => Ok(kind),
            _ => {
                warn!(event = ?event_type, "webhook_event_unsupported");
                Err(WebhookError::UnsupportedEvent)
            }
        }
    }

    /// Authenticate a delivery of a known kind and run its handler.
    pub async fn handle(
        &self,
        kind: EventKind,
        request: &InboundRequest,
    ) -> Result<String, WebhookError> {
        self.authenticate(kind, request)?;

        match kind {
            EventKind::Push => self.handle_push(request).await,
            EventKind::PullRequest => Ok(self.handle_pull_request(request)),
        }
    }

    fn authenticate(&self, kind: EventKind, request: &InboundRequest) -> Result<(), WebhookError> {
        let header = select_signature_header(&request.headers);

        if !verify_signature(&self.secret, request.body.bytes(), header) {
            warn!(event = %kind, has_signature = header.is_some(), "webhook_rejected");
            return Err(WebhookError::Authentication);
        }

        info!(event = %kind, "webhook_authenticated");
        Ok(())
    }

    async fn handle_push(&self, request: &InboundRequest) -> Result<String, WebhookError> {
        let push = PushEvent::from_reader(request.body.replay()).map_err(|e| {
            warn!(error = %e, "push_payload_invalid");
            e
        })?;

        info!(
            pusher = %push.pusher.name,
            has_repository = push.repository.is_some(),
            has_head_commit = push.head_commit.is_some(),
            "push_event_received"
        );

        let created = match (push.status_target(), &self.publisher) {
            (Some(target), Some(publisher)) => {
                let status =
                    CommitStatus::new(StatusState::Pending, &self.status_target_url, &self.status_context);

                let id = publisher.create_status(&target, &status).await.map_err(|e| {
                    error!(error = %e, sha = %target.sha, "commit_status_failed");
                    WebhookError::Transport(format!("Failed to create commit status: {}", e))
                })?;

                Some((id, status))
            }
            (Some(target), None) => {
                warn!(sha = %target.sha, "commit_status_not_configured");
                None
            }
            (None, _) => None,
        };

        Ok(render_push(&push, created.as_ref()))
    }

    fn handle_pull_request(&self, request: &InboundRequest) -> String {
        info!(body_length = request.body.len(), "pull_request_event_received");
        "Handling a pull_request event".to_string()
    }
}

fn render_push(push: &PushEvent, created: Option<&(u64, CommitStatus)>) -> String {
    let mut out = String::from("Handling a push event:\n\n");

    let _ = writeln!(out, "pusher: {} <{}>", push.pusher.name, push.pusher.email);
    if let Some(git_ref) = &push.git_ref {
        let _ = writeln!(out, "ref: {}", git_ref);
    }
    if let Some(repository) = &push.repository {
        let owner = repository.owner.display_name().unwrap_or_default();
        let _ = writeln!(out, "repository: {}/{}", owner, repository.name);
    }
    if let Some(head_commit) = &push.head_commit {
        let _ = writeln!(out, "head commit: {}", head_commit.id);
    }

    if let Some((id, status)) = created {
        let _ = write!(
            out,
            "\nCreated status:\n\nid: {}\nstate: {}\ndescription: {}\ncontext: {}\ntarget_url: {}\n",
            id, status.state, status.description, status.context, status.target_url
        );
    }

    out
}
