//! # HTTP Request Handlers
//!
//! Axum handlers organized by feature domain.
//!
//! - **[`auth`]**: registration, cookie login/logout, password reset, verification
//! - **[`users`]**: current-user profile, superuser account management, greeting route
//!
//! ## Handler Architecture
//!
//! Handlers receive their collaborators through extractors rather than raw state:
//!
//! ```rust,ignore
//! async fn handler(
//!     ctx: AuthContext,                 // manager + strategy over the request's DbSession
//!     current: CurrentActiveUser,       // 401 unless a valid token names an active user
//!     Json(payload): Json<RequestBody>, // request body, always last
//! ) -> lib_core::Result<Json<Response>> {
//!     // ...
//! }
//! ```
//!
//! Errors are [`lib_core::AppError`] values, rendered as
//! `{"error": "...", "code": "..."}` with the matching status.

pub mod auth;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;
