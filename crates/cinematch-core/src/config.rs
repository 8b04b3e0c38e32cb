//! Client configuration
//!
//! Settings for reaching the recommendation service: base origin, optional
//! request timeout, and where the session token is persisted. Values can be
//! set programmatically with the `with_*` builders or picked up from the
//! environment (`CINEMATCH_BASE_URL`, `CINEMATCH_REQUEST_TIMEOUT_SECS`,
//! `CINEMATCH_TOKEN_PATH`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default origin of the recommendation service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration for the CineMatch client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base origin the API is reachable at; the token is never sent elsewhere
    pub base_url: String,
    /// Per-request timeout. `None` lets a request remain pending indefinitely,
    /// matching the observed upstream behavior; setting a value is a local
    /// policy choice applied at the wire.
    #[serde(default)]
    pub request_timeout: Option<Duration>,
    /// Override for the persisted-token location (defaults to a well-known
    /// file under the user's home directory)
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            token_path: None,
        }
    }
}

impl ClientConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base origin
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the persisted-token location
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Build a config from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("CINEMATCH_BASE_URL") {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }

        if let Ok(raw) = std::env::var("CINEMATCH_REQUEST_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => config.request_timeout = Some(Duration::from_secs(secs)),
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring unparseable request timeout");
                }
            }
        }

        if let Ok(path) = std::env::var("CINEMATCH_TOKEN_PATH") {
            if !path.is_empty() {
                config.token_path = Some(PathBuf::from(path));
            }
        }

        config
    }
}
