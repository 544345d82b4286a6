//! # Centralized Error Handling
//!
//! Application-wide error type [`AppError`] used across the core and web
//! crates. Each variant maps to one HTTP status and one stable error code.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx)
//!    - [`InvalidInput`](AppError::InvalidInput), [`InvalidPassword`](AppError::InvalidPassword) → 400
//!    - [`BadCredentials`](AppError::BadCredentials) → 400
//!    - [`ResetPasswordBadToken`](AppError::ResetPasswordBadToken),
//!      [`VerifyUserBadToken`](AppError::VerifyUserBadToken),
//!      [`VerifyUserAlreadyVerified`](AppError::VerifyUserAlreadyVerified) → 400
//!    - [`Unauthorized`](AppError::Unauthorized) → 401
//!    - [`Forbidden`](AppError::Forbidden) → 403
//!    - [`NotFound`](AppError::NotFound) → 404
//!    - [`UserAlreadyExists`](AppError::UserAlreadyExists) → 409
//!
//! 2. **Server Errors** (5xx)
//!    - [`Config`](AppError::Config), [`Internal`](AppError::Internal) → 500
//!
//! Response body:
//!
//! ```text
//! { "error": "Invalid credentials", "code": "LOGIN_BAD_CREDENTIALS" }
//! ```

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

use crate::dto::ErrorResponse;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Password rejected by the password policy.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Unknown email, wrong password or inactive account at login.
    #[error("Invalid credentials")]
    BadCredentials,

    /// Password-reset token is malformed, expired, stale or for an unusable account.
    #[error("Invalid password reset token")]
    ResetPasswordBadToken,

    /// Verification token is malformed, expired or does not match the account.
    #[error("Invalid verification token")]
    VerifyUserBadToken,

    #[error("User is already verified")]
    VerifyUserAlreadyVerified,

    /// No valid session for a protected resource.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Another account already uses this email.
    #[error("A user with this email already exists")]
    UserAlreadyExists,

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::InvalidPassword(_)
            | AppError::BadCredentials
            | AppError::ResetPasswordBadToken
            | AppError::VerifyUserBadToken
            | AppError::VerifyUserAlreadyVerified => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::InvalidPassword(_) => "INVALID_PASSWORD",
            AppError::BadCredentials => "LOGIN_BAD_CREDENTIALS",
            AppError::ResetPasswordBadToken => "RESET_PASSWORD_BAD_TOKEN",
            AppError::VerifyUserBadToken => "VERIFY_USER_BAD_TOKEN",
            AppError::VerifyUserAlreadyVerified => "VERIFY_USER_ALREADY_VERIFIED",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::InvalidPassword(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Config(_) | AppError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Server error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.user_message(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<lib_auth::Error> for AppError {
    fn from(err: lib_auth::Error) -> Self {
        match err {
            lib_auth::Error::PwdTooShort(_) => AppError::InvalidPassword(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
