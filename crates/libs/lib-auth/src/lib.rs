//! # Authentication Library
//!
//! Password hashing, purpose-scoped signed tokens (password reset, email
//! verification) and opaque access tokens for the database strategy.

pub mod access;
pub mod error;
pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use access::{generate_access_token, is_token_valid, ACCESS_TOKEN_LIFETIME_SECS};
pub use error::{Error, Result};
pub use pwd::{hash_password, verify_password};
pub use token::{decode_purpose_token, encode_purpose_token, PurposeClaims, RESET_PASSWORD_AUDIENCE, VERIFY_USER_AUDIENCE};
