use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::session::Session;
use super::store::SessionStore;
use crate::api::resources::LOGIN_ENDPOINT;
use crate::api::{ApiClient, ApiError, AuthRequirement, Method};
use crate::error::{AppError, AppResult};

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest").field("email", &self.email).field("password", &"<redacted>").finish()
    }
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: Session,
}

#[derive(Deserialize)]
struct LoginEnvelope {
    #[serde(default)]
    user: Option<Value>,
}

pub trait AuthProvider: Send + Sync {
    fn login<'a>(&'a self, req: &'a LoginRequest) -> BoxFuture<'a, AppResult<LoginResponse>>;
}

/// Logs in against the storefront API and records the session on success.
pub struct RemoteAuthProvider {
    client: ApiClient,
}

impl RemoteAuthProvider {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    async fn login_inner(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(AppError::user("missing_credentials", "email and password are required"));
        }
        let body = serde_json::to_value(req)?;
        let raw = match self.client.request(Method::POST, LOGIN_ENDPOINT, Some(body), AuthRequirement::Anonymous).await {
            Ok(v) => v,
            Err(ApiError::Unauthenticated) => return Err(invalid_credentials()),
            Err(e) => return Err(e.into()),
        };
        let envelope: LoginEnvelope = serde_json::from_value(raw).map_err(|_| invalid_credentials())?;
        let user = match envelope.user {
            Some(u) if !u.is_null() => u,
            _ => {
                warn!(target: "storefront_admin::session", "login response carried no user record");
                return Err(invalid_credentials());
            }
        };
        let session: Session = serde_json::from_value(user).map_err(|e| {
            warn!(target: "storefront_admin::session", "login response user record rejected: {}", e);
            invalid_credentials()
        })?;
        self.client.store().save(&session)?;
        info!(target: "storefront_admin::session", "auth.login user={} role={}", session.id, session.role.as_str());
        Ok(LoginResponse { session })
    }
}

impl AuthProvider for RemoteAuthProvider {
    fn login<'a>(&'a self, req: &'a LoginRequest) -> BoxFuture<'a, AppResult<LoginResponse>> {
        self.login_inner(req).boxed()
    }
}

fn invalid_credentials() -> AppError {
    AppError::auth("invalid_credentials", "login failed: invalid credentials")
}

/// Forget the current session. Clearing an absent session is not an error.
pub fn logout(store: &dyn SessionStore) -> AppResult<()> {
    store.clear()?;
    info!(target: "storefront_admin::session", "auth.logout");
    Ok(())
}
