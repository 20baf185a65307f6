use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type SessionToken = String;

/// Role carried by a session. The storefront API only distinguishes admins;
/// every other role string collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Other,
}

impl Role {
    /// Only the exact string `"admin"` is an admin; the server compares it verbatim.
    pub fn from_wire(raw: &str) -> Role {
        if raw == "admin" { Role::Admin } else { Role::Other }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Other => "other",
        }
    }
}

/// Unvalidated record as it appears in storage or in the login response.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredSession {
    #[serde(alias = "_id")]
    id: String,
    role: String,
    token: String,
}

/// Authenticated identity: user id, role and bearer token.
///
/// A `Session` can only be built from well-formed data; a record with an empty
/// id, role or token never becomes a `Session`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredSession")]
pub struct Session {
    pub id: String,
    pub role: Role,
    pub token: SessionToken,
}

impl Session {
    pub fn new(id: impl Into<String>, role: Role, token: impl Into<String>) -> Self {
        Self { id: id.into(), role, token: token.into() }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check the same rules a stored record must pass to load.
    pub fn validate(&self) -> Result<(), AppError> {
        check_fields(&self.id, &self.token)
    }
}

fn check_fields(id: &str, token: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::validation("session_id_empty", "session id is empty"));
    }
    if token.trim().is_empty() {
        return Err(AppError::validation("session_token_empty", "session token is empty"));
    }
    Ok(())
}

impl TryFrom<StoredSession> for Session {
    type Error = AppError;

    fn try_from(raw: StoredSession) -> Result<Self, Self::Error> {
        if raw.role.trim().is_empty() {
            return Err(AppError::validation("session_role_empty", "session role is empty"));
        }
        check_fields(&raw.id, &raw.token)?;
        Ok(Session { id: raw.id, role: Role::from_wire(&raw.role), token: raw.token })
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}
