//! # Database Strategy
//!
//! Opaque access tokens persisted in the `access_tokens` table.
//!
//! ```text
//! write_token ──► issued ──► valid (until created_at + lifetime) ──► expired
//!                               │
//!                     destroy_token (logout)
//! ```
//!
//! Expired rows are ignored, not deleted; `purge-tokens` cleans them up.

use lib_auth::{generate_access_token, is_token_valid};
use lib_core::model::manager::UserManager;
use lib_core::model::store::{AccessTokenForCreate, AccessTokenStore, User, UserStore};
use lib_core::{AppError, Result};
use lib_utils::{b64u_decode, now_utc};
use tracing::debug;

pub struct DatabaseStrategy<T: AccessTokenStore> {
    store: T,
    lifetime_secs: i64,
}

impl<T: AccessTokenStore> DatabaseStrategy<T> {
    pub fn new(store: T, lifetime_secs: i64) -> Self {
        Self { store, lifetime_secs }
    }

    /// Resolve a presented token to its user.
    ///
    /// `None` when the token is absent, malformed, unknown, expired or names
    /// a user that no longer exists. The active flag is checked by the caller.
    pub async fn read_token<S: UserStore>(
        &self,
        token: Option<&str>,
        manager: &UserManager<S>,
    ) -> Result<Option<User>> {
        let Some(token) = token else {
            return Ok(None);
        };

        // Every issued token is base64url; anything else cannot be in the table
        if b64u_decode(token).is_err() {
            debug!("[AUTH] Malformed access token");
            return Ok(None);
        }

        let Some(access_token) = self.store.get_by_token(token).await? else {
            debug!("[AUTH] Unknown access token");
            return Ok(None);
        };

        if !is_token_valid(access_token.created_at, self.lifetime_secs, now_utc()) {
            debug!("[AUTH] Expired access token for user {}", access_token.user_id);
            return Ok(None);
        }

        match manager.get(access_token.user_id).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Issue and store a new token for `user`.
    pub async fn write_token(&self, user: &User) -> Result<String> {
        let token = generate_access_token();
        self.store
            .create(AccessTokenForCreate::new(token.clone(), user.id))
            .await?;
        Ok(token)
    }

    /// Delete a token. Unknown tokens are ignored.
    pub async fn destroy_token(&self, token: &str) -> Result<()> {
        if let Some(access_token) = self.store.get_by_token(token).await? {
            self.store.delete(&access_token).await?;
        }
        Ok(())
    }
}
