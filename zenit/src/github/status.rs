//! Commit status types and the publisher seam.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// State of a commit status, as accepted by the GitHub statuses API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Error,
    Failure,
    Pending,
    Success,
}

impl StatusState {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusState::Error => "error",
            StatusState::Failure => "failure",
            StatusState::Pending => "pending",
            StatusState::Success => "success",
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commit a status is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTarget {
    pub owner: String,
    pub repo: String,
    pub sha: String,
}

/// Body of a create-status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub state: StatusState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}

impl CommitStatus {
    /// Build a status reporting `state` under `context`.
    ///
    /// The target URL is `{target_base}/{state}` and the description is
    /// `{context}: {state}`.
    pub fn new(state: StatusState, target_base: &str, context: &str) -> Self {
        Self {
            state,
            target_url: format!("{}/{}", target_base.trim_end_matches('/'), state),
            description: format!("{}: {}", context, state),
            context: context.to_string(),
        }
    }
}

/// Creates commit statuses on the hosting platform.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Create `status` on `target`, returning the id of the new status.
    async fn create_status(&self, target: &StatusTarget, status: &CommitStatus) -> Result<u64>;
}
