//! # Password Hashing
//!
//! Password hashing and verification using Argon2.

use crate::error::{Error, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password using the Argon2 algorithm.
pub fn hash_password(password: &str) -> Result<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::PwdTooShort(MIN_PASSWORD_LEN));
    }

    argon2_hash(password)
}

/// Verify a plaintext password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::PwdHashParse(e.to_string()))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Fingerprint of a stored password hash.
///
/// Embedded in password-reset tokens so that a token stops working as soon as
/// the password it was issued for has changed. Check with [`verify_password`].
pub fn fingerprint(password_hash: &str) -> Result<String> {
    argon2_hash(password_hash)
}

fn argon2_hash(value: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(value.as_bytes(), &salt)
        .map_err(|e| Error::PwdHash(e.to_string()))?
        .to_string();

    Ok(hash)
}
