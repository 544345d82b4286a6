//! # Access Tokens
//!
//! Opaque session tokens for the database strategy. A token carries no
//! information itself: it is a random key into the `access_tokens` table, and
//! its validity depends only on the stored creation time.

use chrono::{DateTime, Duration, Utc};
use lib_utils::b64u_encode;
use rand_core::{OsRng, RngCore};

/// Fixed lifetime of an access token, in seconds.
pub const ACCESS_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Random bytes per token (43 base64url characters).
const ACCESS_TOKEN_BYTES: usize = 32;

/// Generate a new random, URL-safe access token.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; ACCESS_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    b64u_encode(bytes)
}

/// Whether a token created at `created_at` is still valid at `now`.
///
/// Valid from issuance up to and including `created_at + lifetime_secs`,
/// compared at full timestamp precision.
/// No sliding expiry: use does not extend the window.
pub fn is_token_valid(created_at: DateTime<Utc>, lifetime_secs: i64, now: DateTime<Utc>) -> bool {
    now <= created_at + Duration::seconds(lifetime_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_access_token_shape() {
        let token = generate_access_token();

        assert_eq!(token.len(), 43);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generate_access_token_unique() {
        assert_ne!(generate_access_token(), generate_access_token());
    }

    #[test]
    fn test_token_validity_window() {
        let issued = Utc::now();
        let lifetime = ACCESS_TOKEN_LIFETIME_SECS;

        assert!(is_token_valid(issued, lifetime, issued));
        assert!(is_token_valid(issued, lifetime, issued + Duration::seconds(3599)));
        assert!(is_token_valid(issued, lifetime, issued + Duration::seconds(3600)));
        assert!(!is_token_valid(issued, lifetime, issued + Duration::seconds(3601)));
        assert!(!is_token_valid(issued, lifetime, issued + Duration::days(2)));
    }

    #[test]
    fn test_token_expires_within_final_second() {
        let issued = Utc::now();
        let deadline = issued + Duration::seconds(ACCESS_TOKEN_LIFETIME_SECS);

        assert!(is_token_valid(issued, ACCESS_TOKEN_LIFETIME_SECS, deadline));
        assert!(!is_token_valid(
            issued,
            ACCESS_TOKEN_LIFETIME_SECS,
            deadline + Duration::milliseconds(1)
        ));
        assert!(!is_token_valid(
            issued,
            ACCESS_TOKEN_LIFETIME_SECS,
            deadline + Duration::milliseconds(999)
        ));
    }
}
