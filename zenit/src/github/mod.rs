//! GitHub commit status integration.
//!
//! After an authenticated push the receiver attaches a commit status to the
//! pushed head commit. The call goes through [`StatusPublisher`] so the
//! dispatcher can be exercised without the network.

pub mod client;
pub mod status;

pub use client::GitHubStatusClient;
pub use status::{CommitStatus, StatusPublisher, StatusState, StatusTarget};

#[cfg(test)]
pub mod mock;
