use std::sync::Arc;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::identity::SharedSessionStore;
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("network error: {0}")]
    Network(String),
    #[error("remote error {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid request url: {0}")]
    Url(String),
}

/// Whether a call needs the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Fail with `Unauthenticated` before any I/O when there is no token.
    Required,
    /// Attach the token when present, otherwise send without it.
    Optional,
    /// Never attach credentials (the login call).
    Anonymous,
}

/// HTTP client for the storefront API.
///
/// Each call reads the session store afresh; tokens are never cached on the
/// client. The client never writes to the store.
#[derive(Clone)]
pub struct ApiClient {
    base: String,
    store: SharedSessionStore,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(config: &AdminConfig, store: SharedSessionStore) -> AppResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)
            .map_err(|e| AppError::config("http_client", e))?;
        Self::with_transport(&config.api_url, store, Arc::new(transport))
    }

    pub fn with_transport(base: &str, store: SharedSessionStore, transport: Arc<dyn HttpTransport>) -> AppResult<Self> {
        let base = base.trim().trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|e| AppError::config("invalid_api_url", format!("'{}': {}", base, e)))?;
        Ok(Self { base, store, transport })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn store(&self) -> &SharedSessionStore {
        &self.store
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let sep = if path.starts_with('/') { "" } else { "/" };
        Url::parse(&format!("{}{}{}", self.base, sep, path)).map_err(|e| ApiError::Url(format!("{}: {}", path, e)))
    }

    /// Issue one call and classify its outcome.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>, auth: AuthRequirement) -> Result<Value, ApiError> {
        let bearer = match auth {
            AuthRequirement::Anonymous => None,
            AuthRequirement::Required | AuthRequirement::Optional => self.store.load().map(|s| s.token),
        };
        if auth == AuthRequirement::Required && bearer.is_none() {
            debug!(target: "storefront_admin::api", "{} {} refused locally: no session token", method, path);
            return Err(ApiError::Unauthenticated);
        }
        let url = self.url_for(path)?;
        debug!(
            target: "storefront_admin::api",
            "{} {} auth={:?} bearer_present={}", method, url.path(), auth, bearer.is_some()
        );
        let req = HttpRequest { method: method.clone(), url, bearer, body };
        match self.transport.send(req).await {
            Ok(resp) => {
                let out = classify_response(&resp);
                if let Err(e) = &out {
                    warn!(target: "storefront_admin::api", "{} {} failed: {}", method, path, e);
                }
                out
            }
            Err(e) => {
                warn!(target: "storefront_admin::api", "{} {} network failure: {}", method, path, e);
                Err(ApiError::Network(e))
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, auth: AuthRequirement) -> Result<T, ApiError> {
        let v = self.request(Method::GET, path, None, auth).await?;
        decode(v)
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B, auth: AuthRequirement) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let v = self.request(method, path, Some(body), auth).await?;
        decode(v)
    }

    pub async fn delete(&self, path: &str, auth: AuthRequirement) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, None, auth).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(v: Value) -> Result<T, ApiError> {
    serde_json::from_value(v).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map a received response onto the client's outcome taxonomy.
pub fn classify_response(resp: &HttpResponse) -> Result<Value, ApiError> {
    let blank = resp.body.iter().all(|b| b.is_ascii_whitespace());
    let parsed: Option<Value> = if blank { None } else { serde_json::from_slice(&resp.body).ok() };
    match resp.status {
        200..=299 if blank => Ok(Value::Null),
        200..=299 => parsed.ok_or_else(|| ApiError::Decode("response body is not JSON".to_string())),
        401 | 403 => Err(ApiError::Unauthenticated),
        status => {
            let message = parsed
                .as_ref()
                .and_then(|v| v.get("message").or_else(|| v.get("error")))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| reason_phrase(status));
            Err(ApiError::Remote { status, message })
        }
    }
}

fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unexpected status")
        .to_string()
}
