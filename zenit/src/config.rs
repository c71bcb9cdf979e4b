//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup into a [`Config`] value which is
//! then passed to the router. Nothing below reads the environment again.

use std::env;
use std::fmt;

use thiserror::Error;
use tracing::warn;
use url::Url;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com/";
const DEFAULT_STATUS_TARGET_URL: &str = "https://zen.it.example";
const DEFAULT_STATUS_CONTEXT: &str = "zen";
const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 8000;

/// Startup configuration errors. The process refuses to start on any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("${0} must be set")]
    Missing(&'static str),

    #[error("${name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared webhook secret used for HMAC signature verification
    pub secret: String,

    /// GitHub access token for commit status updates
    pub token: Option<String>,

    /// Base URL of the GitHub REST API, always ending in `/`
    pub github_api_url: Url,

    /// Base URL for commit status target links
    pub status_target_url: String,

    /// Context name attached to commit statuses
    pub status_context: String,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("PORT"))?;
        let port = port.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
            name: "PORT",
            reason: e.to_string(),
        })?;

        let secret = lookup("SECRET")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("SECRET"))?;

        let token = lookup("TOKEN").filter(|v| !v.trim().is_empty());

        let github_api_url = parse_base_url(
            "GITHUB_API_URL",
            lookup("GITHUB_API_URL").as_deref().unwrap_or(DEFAULT_GITHUB_API_URL),
        )?;

        let status_target_url = lookup("STATUS_TARGET_URL")
            .unwrap_or_else(|| DEFAULT_STATUS_TARGET_URL.to_string());
        Url::parse(&status_target_url).map_err(|e| ConfigError::Invalid {
            name: "STATUS_TARGET_URL",
            reason: e.to_string(),
        })?;

        Ok(Config {
            port,
            secret,
            token,
            github_api_url,
            status_target_url: status_target_url.trim_end_matches('/').to_string(),
            status_context: lookup("STATUS_CONTEXT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS_CONTEXT.to_string()),
            max_body_bytes: parse_or(
                "MAX_BODY_BYTES",
                lookup("MAX_BODY_BYTES"),
                DEFAULT_MAX_BODY_BYTES,
            ),
            request_timeout_ms: parse_or(
                "REQUEST_TIMEOUT_MS",
                lookup("REQUEST_TIMEOUT_MS"),
                DEFAULT_REQUEST_TIMEOUT_MS,
            ),
        })
    }

    /// Whether commit statuses can be posted.
    pub fn status_updates_enabled(&self) -> bool {
        self.token.is_some()
    }
}

// Secret and token stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("secret", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("github_api_url", &self.github_api_url.as_str())
            .field("status_target_url", &self.status_target_url)
            .field("status_context", &self.status_context)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

/// Parse a positive numeric variable, falling back to the default on bad
/// input. Zero counts as bad input.
fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + Default + PartialEq,
{
    let raw = match raw {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse::<T>() {
        Ok(v) if v != T::default() => v,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

/// Parse a base URL and make sure relative joins keep its path.
fn parse_base_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }

    let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            name,
            reason: "not a base URL".to_string(),
        });
    }

    Ok(url)
}
