//! Push event payload.
//!
//! Only the fields the receiver acts on are modelled. Everything else GitHub
//! sends is ignored during deserialization.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::WebhookError;
use crate::github::StatusTarget;

/// A `push` delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    /// Who pushed (required)
    pub pusher: Pusher,
    /// Repository pushed to
    #[serde(default)]
    pub repository: Option<Repository>,
    /// Commit at the tip of the pushed ref; `null` when a branch is deleted
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
    /// Full ref name, e.g. `refs/heads/main`
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pusher {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

/// Repository owner. Push payloads carry both `name` and `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
}

impl Owner {
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.login.as_deref().filter(|l| !l.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadCommit {
    pub id: String,
}

impl PushEvent {
    /// Deserialize and validate a push payload.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, WebhookError> {
        let event: PushEvent = serde_json::from_reader(reader)
            .map_err(|e| WebhookError::Validation(e.to_string()))?;
        event.validate()?;
        Ok(event)
    }

    fn validate(&self) -> Result<(), WebhookError> {
        if self.pusher.name.trim().is_empty() {
            return Err(WebhookError::Validation("pusher.name is empty".to_string()));
        }
        if self.pusher.email.trim().is_empty() {
            return Err(WebhookError::Validation("pusher.email is empty".to_string()));
        }
        if let Some(repository) = &self.repository {
            if repository.name.trim().is_empty() {
                return Err(WebhookError::Validation(
                    "repository.name is empty".to_string(),
                ));
            }
            if repository.owner.display_name().is_none() {
                return Err(WebhookError::Validation(
                    "repository.owner has no name".to_string(),
                ));
            }
        }
        if let Some(head_commit) = &self.head_commit {
            if head_commit.id.trim().is_empty() {
                return Err(WebhookError::Validation(
                    "head_commit.id is empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The commit a status can be attached to, if the payload names one.
    pub fn status_target(&self) -> Option<StatusTarget> {
        let repository = self.repository.as_ref()?;
        let head_commit = self.head_commit.as_ref()?;
        let owner = repository.owner.display_name()?;

        Some(StatusTarget {
            owner: owner.to_string(),
            repo: repository.name.clone(),
            sha: head_commit.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<PushEvent, WebhookError> {
        PushEvent::from_reader(json.as_bytes())
    }

    #[test]
    fn test_minimal_push() {
        let push = parse(r#"{"pusher":{"name":"alice","email":"a@x.com"}}"#).unwrap();

        assert_eq!(push.pusher.name, "alice");
        assert_eq!(push.pusher.email, "a@x.com");
        assert!(push.repository.is_none());
        assert!(push.status_target().is_none());
    }

    #[test]
    fn test_full_push() {
        let push = parse(
            r#"{
                "ref": "refs/heads/main",
                "pusher": {"name": "alice", "email": "a@x.com"},
                "repository": {"name": "zen", "owner": {"name": "octo", "login": "octo-login"}},
                "head_commit": {"id": "17a6dafbf2d4c318f16102f8840c5f3c4f9e367c", "message": "Update README"},
                "sender": {"login": "alice"}
            }"#,
        )
        .unwrap();

        assert_eq!(push.git_ref.as_deref(), Some("refs/heads/main"));
        let target = push.status_target().unwrap();
        assert_eq!(target.owner, "octo");
        assert_eq!(target.repo, "zen");
        assert_eq!(target.sha, "17a6dafbf2d4c318f16102f8840c5f3c4f9e367c");
    }

    #[test]
    fn test_owner_falls_back_to_login() {
        let push = parse(
            r#"{
                "pusher": {"name": "alice", "email": "a@x.com"},
                "repository": {"name": "zen", "owner": {"login": "octo"}},
                "head_commit": {"id": "abc123"}
            }"#,
        )
        .unwrap();

        assert_eq!(push.status_target().unwrap().owner, "octo");
    }

    #[test]
    fn test_branch_deletion_has_no_target() {
        let push = parse(
            r#"{
                "pusher": {"name": "alice", "email": "a@x.com"},
                "repository": {"name": "zen", "owner": {"name": "octo"}},
                "head_commit": null
            }"#,
        )
        .unwrap();

        assert!(push.status_target().is_none());
    }

    #[test]
    fn test_missing_pusher_name() {
        let err = parse(r#"{"pusher":{"email":"a@x.com"}}"#).unwrap_err();
        assert!(matches!(err, WebhookError::Validation(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_missing_pusher() {
        assert!(matches!(
            parse(r#"{"ref":"refs/heads/main"}"#),
            Err(WebhookError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_required_fields() {
        assert!(matches!(
            parse(r#"{"pusher":{"name":"","email":"a@x.com"}}"#),
            Err(WebhookError::Validation(_))
        ));
        assert!(matches!(
            parse(r#"{"pusher":{"name":"alice","email":" "}}"#),
            Err(WebhookError::Validation(_))
        ));
        assert!(matches!(
            parse(
                r#"{"pusher":{"name":"alice","email":"a@x.com"},
                    "repository":{"name":"zen","owner":{}}}"#
            ),
            Err(WebhookError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse("{not json"), Err(WebhookError::Validation(_))));
        assert!(matches!(parse(""), Err(WebhookError::Validation(_))));
    }
}
