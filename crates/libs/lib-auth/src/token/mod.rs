//! # Purpose Tokens
//!
//! Short-lived signed JWTs used outside of sessions: password reset and
//! email verification. The audience claim pins a token to its purpose, so a
//! verification token can never be replayed as a reset token even though both
//! are signed with the same secret.

use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Audience of password-reset tokens.
pub const RESET_PASSWORD_AUDIENCE: &str = "userauth:reset";

/// Audience of email-verification tokens.
pub const VERIFY_USER_AUDIENCE: &str = "userauth:verify";

/// Claims carried by a purpose token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurposeClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Audience (token purpose)
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Email the token was issued for (verification tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Fingerprint of the password hash at issuance (reset tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_fgpt: Option<String>,
}

impl PurposeClaims {
    /// Build claims for `sub` and `audience`, expiring `lifetime_secs` from now.
    pub fn new(sub: impl Into<String>, audience: &str, lifetime_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            aud: audience.to_string(),
            exp: (now + Duration::seconds(lifetime_secs)).timestamp(),
            iat: now.timestamp(),
            email: None,
            password_fgpt: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_password_fgpt(mut self, fgpt: impl Into<String>) -> Self {
        self.password_fgpt = Some(fgpt.into());
        self
    }
}

/// Sign purpose claims with HS256.
pub fn encode_purpose_token(claims: &PurposeClaims, secret: &str) -> Result<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::TokenEncode(e.to_string()))
}

/// Decode a purpose token, checking signature, expiry and audience.
pub fn decode_purpose_token(token: &str, secret: &str, audience: &str) -> Result<PurposeClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.leeway = 0;

    let token_data = decode::<PurposeClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| Error::TokenDecode(e.to_string()))?;

    Ok(token_data.claims)
}
