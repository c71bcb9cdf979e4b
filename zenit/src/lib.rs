//! zenit - GitHub webhook receiver.
//!
//! Accepts `push` and `pull_request` deliveries, authenticates each one with
//! the shared-secret HMAC signature GitHub attaches, and dispatches it to the
//! matching handler.
//!
//! ## Request flow
//!
//! ```text
//! POST /handle → capture body → dispatch on X-Github-Event → verify signature → handler
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod github;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use dispatch::{Dispatcher, InboundRequest};
pub use error::WebhookError;
pub use events::{EventKind, PushEvent};
pub use github::{CommitStatus, GitHubStatusClient, StatusPublisher, StatusState};
pub use web::{router, AppState};
