//! # Authentication Backend
//!
//! A named pairing of a [`Transport`] with the [`DatabaseStrategy`].
//! The application runs one backend, `accesstoken`, over the session cookie.

use super::strategy::DatabaseStrategy;
use super::transport::{CookieTransport, Transport, COOKIE_NAME};
use axum::response::Response;
use lib_auth::ACCESS_TOKEN_LIFETIME_SECS;
use lib_core::model::store::{AccessTokenStore, DbSession, SqlAccessTokenStore, User};
use lib_core::Result;
use tower_cookies::Cookies;
use tracing::info;

/// Name of the application's backend.
pub const BACKEND_NAME: &str = "accesstoken";

#[derive(Debug, Clone)]
pub struct AuthBackend {
    pub name: String,
    pub transport: Transport,
    pub lifetime_secs: i64,
}

impl AuthBackend {
    pub fn new(name: impl Into<String>, transport: Transport, lifetime_secs: i64) -> Self {
        Self {
            name: name.into(),
            transport,
            lifetime_secs,
        }
    }

    /// `accesstoken`: `userauth` cookie, database tokens valid for one hour.
    pub fn access_token_cookie(cookie_secure: bool) -> Self {
        Self::new(
            BACKEND_NAME,
            Transport::Cookie(CookieTransport::new(COOKIE_NAME, cookie_secure)),
            ACCESS_TOKEN_LIFETIME_SECS,
        )
    }

    /// Strategy bound to one request's session.
    pub fn strategy(&self, session: DbSession) -> DatabaseStrategy<SqlAccessTokenStore> {
        DatabaseStrategy::new(SqlAccessTokenStore::new(session), self.lifetime_secs)
    }

    /// Issue a token for `user` and deliver it through the transport.
    pub async fn login<T: AccessTokenStore>(
        &self,
        strategy: &DatabaseStrategy<T>,
        user: &User,
        cookies: &Cookies,
    ) -> Result<Response> {
        let token = strategy.write_token(user).await?;
        info!("[LOGIN] Backend {} issued token for user {}", self.name, user.id);
        Ok(self.transport.login_response(cookies, token))
    }

    /// Destroy `token` and tell the client to forget it.
    pub async fn logout<T: AccessTokenStore>(
        &self,
        strategy: &DatabaseStrategy<T>,
        user: &User,
        token: &str,
        cookies: &Cookies,
    ) -> Result<Response> {
        strategy.destroy_token(token).await?;
        info!("[LOGOUT] Backend {} destroyed token for user {}", self.name, user.id);
        Ok(self.transport.logout_response(cookies))
    }
}
