//! In-memory [`StatusPublisher`] for tests.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{CommitStatus, StatusPublisher, StatusTarget};

/// Records every status it is asked to create.
#[derive(Default)]
pub struct RecordingPublisher {
    pub fail: bool,
    pub created: Mutex<Vec<(StatusTarget, CommitStatus)>>,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn created(&self) -> Vec<(StatusTarget, CommitStatus)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusPublisher for RecordingPublisher {
    async fn create_status(&self, target: &StatusTarget, status: &CommitStatus) -> Result<u64> {
        if self.fail {
            return Err(anyhow!("status API unavailable"));
        }

        let mut created = self.created.lock().unwrap();
        created.push((target.clone(), status.clone()));
        Ok(created.len() as u64)
    }
}
