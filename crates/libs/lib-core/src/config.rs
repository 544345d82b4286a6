//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `DATABASE_URL` | `sqlite:test.sqlite` | SQLite database file |
//! | `AUTH_SECRET` | `SECRET` | Signing secret for reset and verification tokens |
//! | `COOKIE_SECURE` | `true` | Whether the session cookie carries the `Secure` flag |
//!
//! The default secret is a placeholder. It keeps a fresh checkout runnable,
//! and [`Config::uses_weak_secret`] lets startup warn about it.

use lib_utils::envs::{self, get_env, get_env_parse};

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:test.sqlite";

/// Placeholder secret used when `AUTH_SECRET` is not set.
pub const PLACEHOLDER_SECRET: &str = "SECRET";

/// Secrets shorter than this are reported as weak at startup.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret for signing password-reset and email-verification tokens
    pub auth_secret: String,

    /// Set the `Secure` attribute on the session cookie
    pub cookie_secure: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let auth_secret = get_env("AUTH_SECRET")
            .unwrap_or_else(|_| PLACEHOLDER_SECRET.to_string());

        let cookie_secure = match get_env_parse::<bool>("COOKIE_SECURE") {
            Ok(secure) => secure,
            Err(envs::Error::MissingEnv(_)) => true,
            Err(envs::Error::WrongFormat(_)) => {
                return Err("COOKIE_SECURE must be 'true' or 'false'".to_string())
            }
        };

        Ok(Self {
            database_url,
            auth_secret,
            cookie_secure,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err("DATABASE_URL must not be empty".to_string());
        }

        if self.auth_secret.is_empty() {
            return Err("AUTH_SECRET must not be empty".to_string());
        }

        Ok(())
    }

    /// True when the signing secret is the placeholder or too short for production.
    pub fn uses_weak_secret(&self) -> bool {
        self.auth_secret == PLACEHOLDER_SECRET || self.auth_secret.len() < RECOMMENDED_SECRET_LEN
    }
}
