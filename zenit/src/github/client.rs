//! GitHub REST client for the commit statuses API.
//!
//! Reference: https://docs.github.com/en/rest/commits/statuses#create-a-commit-status

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};
use url::Url;

use super::status::{CommitStatus, StatusPublisher, StatusTarget};
use crate::Config;

const USER_AGENT: &str = "zenit";

/// Posts commit statuses with a token.
#[derive(Clone)]
pub struct GitHubStatusClient {
    client: Client,
    api_base: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CreatedStatus {
    id: u64,
}

impl GitHubStatusClient {
    /// Create a client against `api_base`, which must end in `/`.
    pub fn new(api_base: Url, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base,
            token,
        })
    }

    /// Create a client if a token is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        match &config.token {
            Some(token) => Self::new(
                config.github_api_url.clone(),
                token.clone(),
                Duration::from_millis(config.request_timeout_ms),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    /// `{api_base}repos/{owner}/{repo}/statuses/{sha}`, with each part escaped.
    pub fn statuses_url(&self, target: &StatusTarget) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("GitHub API URL cannot be a base"))?
            .pop_if_empty()
            .extend([
                "repos",
                target.owner.as_str(),
                target.repo.as_str(),
                "statuses",
                target.sha.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl StatusPublisher for GitHubStatusClient {
    async fn create_status(&self, target: &StatusTarget, status: &CommitStatus) -> Result<u64> {
        let url = self.statuses_url(target)?;

        info!(
            owner = %target.owner,
            repo = %target.repo,
            sha = %target.sha,
            state = %status.state,
            "commit_status_creating"
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(status)
            .send()
            .await
            .context("Failed to send commit status request")?;

        let http_status = response.status();
        if !http_status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status_code = http_status.as_u16(),
                body_preview = %body.chars().take(500).collect::<String>(),
                "commit_status_rejected"
            );
            return Err(anyhow!(
                "GitHub rejected commit status with HTTP {}",
                http_status
            ));
        }

        let created: CreatedStatus = response
            .json()
            .await
            .context("Failed to parse commit status response")?;

        info!(status_id = created.id, sha = %target.sha, "commit_status_created");

        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::StatusState;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode, Uri},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<(String, Option<String>, Option<String>, Value)>>>;

    async fn record(
        State((seen, status)): State<(Seen, StatusCode)>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let auth = header("authorization");
        let user_agent = header("user-agent");
        seen.lock()
            .unwrap()
            .push((uri.path().to_string(), auth, user_agent, body));
        (status, Json(json!({ "id": 42, "state": "pending" })))
    }

    async fn spawn_api(status: StatusCode) -> (Url, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/api/v3/repos/:owner/:repo/statuses/:sha", post(record))
            .with_state((seen.clone(), status));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = Url::parse(&format!("http://{}/api/v3/", addr)).unwrap();
        (base, seen)
    }

    fn target() -> StatusTarget {
        StatusTarget {
            owner: "octo".to_string(),
            repo: "zen".to_string(),
            sha: "abc123".to_string(),
        }
    }

    #[test]
    fn test_statuses_url() {
        let client = GitHubStatusClient::new(
            Url::parse("https://ghe.example.com/api/v3/").unwrap(),
            "token".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            client.statuses_url(&target()).unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/octo/zen/statuses/abc123"
        );

        let odd = StatusTarget {
            owner: "a/b".to_string(),
            ..target()
        };
        assert_eq!(
            client.statuses_url(&odd).unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/a%2Fb/zen/statuses/abc123"
        );
    }

    #[tokio::test]
    async fn test_create_status() {
        let (base, seen) = spawn_api(StatusCode::CREATED).await;
        let client =
            GitHubStatusClient::new(base, "ghp_test".to_string(), Duration::from_secs(5)).unwrap();

        let status = CommitStatus::new(StatusState::Pending, "https://zen.it.example", "zen");
        let id = client.create_status(&target(), &status).await.unwrap();

        assert_eq!(id, 42);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, auth, user_agent, body) = &seen[0];
        assert_eq!(path, "/api/v3/repos/octo/zen/statuses/abc123");
        assert_eq!(auth.as_deref(), Some("Bearer ghp_test"));
        assert_eq!(user_agent.as_deref(), Some("zenit"));
        assert_eq!(body["state"], "pending");
        assert_eq!(body["context"], "zen");
        assert_eq!(body["target_url"], "https://zen.it.example/pending");
    }

    #[tokio::test]
    async fn test_create_status_rejected() {
        let (base, _seen) = spawn_api(StatusCode::UNPROCESSABLE_ENTITY).await;
        let client =
            GitHubStatusClient::new(base, "ghp_test".to_string(), Duration::from_secs(5)).unwrap();

        let status = CommitStatus::new(StatusState::Pending, "https://zen.it.example", "zen");
        let err = client.create_status(&target(), &status).await.unwrap_err();

        assert!(err.to_string().contains("422"));
    }

    #[test]
    fn test_from_config_without_token() {
        let config = Config::from_lookup(|name| match name {
            "PORT" => Some("8080".to_string()),
            "SECRET" => Some("s3cr3t".to_string()),
            _ => None,
        })
        .unwrap();

        assert!(GitHubStatusClient::from_config(&config).unwrap().is_none());
    }
}
