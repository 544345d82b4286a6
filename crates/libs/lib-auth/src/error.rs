//! # Auth Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Password must be at least {0} characters long")]
    PwdTooShort(usize),

    #[error("Failed to hash password: {0}")]
    PwdHash(String),

    #[error("Failed to parse hash: {0}")]
    PwdHashParse(String),

    #[error("Failed to encode token: {0}")]
    TokenEncode(String),

    #[error("Failed to decode token: {0}")]
    TokenDecode(String),
}
