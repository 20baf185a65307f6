//! Unified application error model for the admin client.
//! Every failure in the session, guard, policy and API layers maps onto one of
//! these variants, and each variant knows how it is shown to the operator.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::api::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// No usable session in the store.
    SessionAbsent { code: String, message: String },
    /// A session exists but its role may not perform the request.
    RoleDenied { code: String, message: String },
    /// The remote API rejected the credentials (401/403) or none were available.
    Unauthenticated { code: String, message: String },
    /// The request never produced a response.
    NetworkFailure { code: String, message: String },
    /// The remote API answered with a non-success status.
    RemoteError { status: u16, message: String },
    /// A stored or received session record does not have the session shape.
    ValidationFailure { code: String, message: String },
    UserInput { code: String, message: String },
    Auth { code: String, message: String },
    Config { code: String, message: String },
    Decode { code: String, message: String },
    Io { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::RemoteError { .. } => "remote_error",
            AppError::SessionAbsent { code, .. }
            | AppError::RoleDenied { code, .. }
            | AppError::Unauthenticated { code, .. }
            | AppError::NetworkFailure { code, .. }
            | AppError::ValidationFailure { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Config { code, .. }
            | AppError::Decode { code, .. }
            | AppError::Io { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::SessionAbsent { message, .. }
            | AppError::RoleDenied { message, .. }
            | AppError::Unauthenticated { message, .. }
            | AppError::NetworkFailure { message, .. }
            | AppError::RemoteError { message, .. }
            | AppError::ValidationFailure { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Config { message, .. }
            | AppError::Decode { message, .. }
            | AppError::Io { message, .. } => message.as_str(),
        }
    }

    pub fn session_absent<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::SessionAbsent { code: code.into(), message: msg.into() } }
    pub fn role_denied<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::RoleDenied { code: code.into(), message: msg.into() } }
    pub fn unauthenticated<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Unauthenticated { code: code.into(), message: msg.into() } }
    pub fn network<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::NetworkFailure { code: code.into(), message: msg.into() } }
    pub fn remote<M: Into<String>>(status: u16, msg: M) -> Self { AppError::RemoteError { status, message: msg.into() } }
    pub fn validation<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::ValidationFailure { code: code.into(), message: msg.into() } }
    pub fn user<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn auth<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn config<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Config { code: code.into(), message: msg.into() } }
    pub fn decode<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Decode { code: code.into(), message: msg.into() } }
    pub fn io<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Io { code: code.into(), message: msg.into() } }

    /// Remote status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::RemoteError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Absence of a session or an insufficient role. The route guard answers
    /// these with a redirect to the login page instead of a notice.
    pub fn is_access_denial(&self) -> bool {
        matches!(self, AppError::SessionAbsent { .. } | AppError::RoleDenied { .. })
    }

    /// Whether a page should show this error. Malformed stored records are
    /// handled inside the session store and never reach the operator.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, AppError::ValidationFailure { .. })
    }

    /// Text shown to the operator when this error reaches a page.
    pub fn notice_text(&self) -> String {
        match self {
            AppError::SessionAbsent { .. } => "You are not logged in.".to_string(),
            AppError::RoleDenied { .. } => "You are not authorized to do this.".to_string(),
            AppError::Unauthenticated { .. } => "The server rejected your session. Please log in again.".to_string(),
            AppError::NetworkFailure { .. } => "Could not reach the server.".to_string(),
            AppError::RemoteError { status, message } => format!("Request failed ({}): {}", status, message),
            other => other.message().to_string(),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::RemoteError { status, message } => write!(f, "remote_error({}): {}", status, message),
            _ => write!(f, "{}: {}", self.code_str(), self.message()),
        }
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthenticated => AppError::unauthenticated("unauthenticated", "credentials missing or rejected"),
            ApiError::Network(msg) => AppError::NetworkFailure { code: "network".into(), message: msg },
            ApiError::Remote { status, message } => AppError::RemoteError { status, message },
            ApiError::Decode(msg) => AppError::Decode { code: "decode".into(), message: msg },
            ApiError::Url(msg) => AppError::Config { code: "invalid_url".into(), message: msg },
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io { code: "io".into(), message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode { code: "json".into(), message: err.to_string() }
    }
}
