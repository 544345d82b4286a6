//! # Authentication Data Transfer Objects
//!
//! Request and response structures for the `/auth/*` endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /auth/register` - [`UserCreate`](super::UserCreate) -> [`UserRead`](super::UserRead)
//! - `POST /auth/cookie/login` - [`LoginForm`] (form-encoded) -> `204` + cookie
//! - `POST /auth/forgot-password` - [`ForgotPasswordRequest`] -> `202`
//! - `POST /auth/reset-password` - [`ResetPasswordRequest`] -> [`UserRead`](super::UserRead)
//! - `POST /auth/request-verify-token` - [`RequestVerifyTokenRequest`] -> `202`
//! - `POST /auth/verify` - [`VerifyRequest`] -> [`UserRead`](super::UserRead)
//!
//! ## Login Flow
//!
//! ```text
//! POST /auth/cookie/login
//! Content-Type: application/x-www-form-urlencoded
//!
//! username=alice%40example.com&password=MyPassword123!
//! ```
//!
//! Response:
//! ```text
//! HTTP/1.1 204 No Content
//! set-cookie: userauth=Xq3...; HttpOnly; SameSite=Lax; Secure; Path=/
//! ```

use serde::{Deserialize, Serialize};

/// Login form, OAuth2 password-flow shaped.
///
/// `username` carries the account email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login response of the bearer transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BearerResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestVerifyTokenRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyRequest {
    pub token: String,
}

/// Plain message body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body produced by [`AppError`](crate::AppError).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
