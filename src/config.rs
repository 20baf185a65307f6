use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const ENV_API_URL: &str = "STOREFRONT_API_URL";
pub const ENV_SESSION_DIR: &str = "STOREFRONT_SESSION_DIR";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "STOREFRONT_HTTP_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const SESSION_DIR_NAME: &str = ".storefront-admin";

/// Settings for the admin client. Environment values are read once at startup;
/// command-line flags override them through the `with_*` builders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminConfig {
    /// Base URL of the storefront REST API, without trailing slash.
    pub api_url: String,
    /// Directory holding the durable session record.
    pub session_dir: PathBuf,
    /// Transport timeout. `None` leaves the HTTP client's own behavior in place.
    pub request_timeout: Option<Duration>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_dir: default_session_dir(None),
            request_timeout: None,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AdminConfig {
            session_dir: default_session_dir(lookup("HOME").or_else(|| lookup("USERPROFILE")).as_deref()),
            ..Default::default()
        };
        if let Some(url) = lookup(ENV_API_URL).filter(|s| !s.trim().is_empty()) {
            cfg = cfg.with_api_url(url)?;
        }
        if let Some(dir) = lookup(ENV_SESSION_DIR).filter(|s| !s.trim().is_empty()) {
            cfg = cfg.with_session_dir(dir);
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS).filter(|s| !s.trim().is_empty()) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::config("invalid_timeout", &format!("{} must be a whole number of seconds, got '{}'", ENV_HTTP_TIMEOUT_SECS, raw))
            })?;
            cfg = cfg.with_request_timeout(Duration::from_secs(secs));
        }
        Ok(cfg)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&trimmed)
            .map_err(|e| AppError::config("invalid_api_url", &format!("'{}': {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::config("invalid_api_url", &format!("'{}': scheme must be http or https", url)));
        }
        self.api_url = trimmed;
        Ok(self)
    }

    pub fn with_session_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.session_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn default_session_dir(home: Option<&str>) -> PathBuf {
    match home {
        Some(h) if !h.is_empty() => Path::new(h).join(SESSION_DIR_NAME),
        _ => PathBuf::from(SESSION_DIR_NAME),
    }
}
