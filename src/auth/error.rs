//! Failure Translator
//! Mission: Map every authentication/authorization failure to a fixed,
//! security-conscious response
//!
//! Two body shapes exist, mirroring where a failure surfaces:
//! - entry-point failures (emitted by the gate middleware, which knows the
//!   request path) use the full `{timestamp, status, error, message, path}`
//!   shape;
//! - failures raised inside handlers use the narrower `{message}` shape.
//!
//! Messages are deliberately generic: no token parsing internals, no hint of
//! which half of a credential pair was wrong, no detail on what permission a
//! denied request was missing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Full error body for entry-point-level security failures.
#[derive(Debug, Serialize)]
pub struct SecurityErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl SecurityErrorBody {
    fn new(status: StatusCode, message: &str, path: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: message.to_string(),
            path: path.to_string(),
        }
    }
}

/// 401 response for requests that reached a guarded operation without an
/// authenticated principal.
pub fn unauthorized_response(path: &str) -> Response {
    let body = SecurityErrorBody::new(
        StatusCode::UNAUTHORIZED,
        "Authentication required. Please provide a valid access token.",
        path,
    );
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// 403 response for authenticated principals that fail an access rule.
pub fn forbidden_response(path: &str) -> Response {
    let body = SecurityErrorBody::new(
        StatusCode::FORBIDDEN,
        "Access denied. You don't have permission to access this resource.",
        path,
    );
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

/// Failures raised by auth handlers and use cases.
///
/// These translate to the narrower `{message}` body. The distinction between
/// 401 (authentication) and 403 (authorization) is load-bearing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Guarded operation reached without a principal
    AuthenticationRequired,
    /// Bad email or bad password at login; never distinguished
    InvalidCredentials,
    /// Account exists but is deactivated
    AccountInactive,
    /// Refresh token failed signature/expiry checks
    InvalidRefreshToken,
    /// A token of the wrong class was presented to the refresh flow
    ExpectedRefreshToken,
    /// Token was valid but the account behind it no longer exists
    UserNotFound,
    /// Registration conflict
    EmailAlreadyRegistered,
    /// Password below minimum length
    WeakPassword,
    /// Authenticated but not permitted
    Forbidden,
    /// Self-deletion guard on admin user management
    CannotDeleteSelf,
    /// Target of an admin operation does not exist
    AccountNotFound,
    /// Anything genuinely unexpected; details stay in the logs
    Internal,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::AuthenticationRequired
            | AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::InvalidRefreshToken
            | AuthError::ExpectedRefreshToken
            | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::EmailAlreadyRegistered => StatusCode::CONFLICT,
            AuthError::WeakPassword | AuthError::CannotDeleteSelf => StatusCode::BAD_REQUEST,
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired => {
                "Authentication required. Please provide a valid access token."
            }
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::AccountInactive => "Account is inactive",
            AuthError::InvalidRefreshToken => "Invalid or expired refresh token",
            AuthError::ExpectedRefreshToken => "Invalid token type. Expected REFRESH token.",
            AuthError::UserNotFound => "User not found",
            AuthError::EmailAlreadyRegistered => "Email already registered",
            AuthError::WeakPassword => "Password must be at least 8 characters",
            AuthError::Forbidden => {
                "Access denied. You don't have permission to access this resource."
            }
            AuthError::CannotDeleteSelf => "Cannot delete your own account",
            AuthError::AccountNotFound => "User not found",
            AuthError::Internal => "Internal server error",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}
