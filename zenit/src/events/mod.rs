//! GitHub event types handled by the receiver.
//!
//! ## Dispatch
//!
//! ```text
//! X-Github-Event → EventKind → handler
//! ```

pub mod push;

use std::fmt;
use std::str::FromStr;

use crate::error::WebhookError;

pub use push::{HeadCommit, Owner, PushEvent, Pusher, Repository};

/// Header carrying the event type of a delivery.
pub const EVENT_HEADER: &str = "X-Github-Event";

/// Event types with a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
        }
    }
}

impl FromStr for EventKind {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(EventKind::Push),
            "pull_request" => Ok(EventKind::PullRequest),
            _ => Err(WebhookError::UnsupportedEvent),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
