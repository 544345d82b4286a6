//! # Authentication Wiring
//!
//! Transports, the database token strategy, the `accesstoken` backend and the
//! extractors handlers use to reach them.
//!
//! ## Request Flow
//!
//! ```text
//! request ──► DbSession (one pooled connection, cached per request)
//!               ├── UserManager<SqlUserStore>
//!               └── DatabaseStrategy<SqlAccessTokenStore>
//!                        │
//!      cookie `userauth` ┴─► read_token ──► CurrentUser / CurrentActiveUser / CurrentSuperuser
//! ```

// region: --- Modules
pub mod backend;
pub mod current_user;
pub mod strategy;
pub mod transport;
// endregion: --- Modules

// region: --- Re-exports
pub use backend::{AuthBackend, BACKEND_NAME};
pub use current_user::{CurrentActiveUser, CurrentSuperuser, CurrentUser};
pub use strategy::DatabaseStrategy;
pub use transport::{BearerTransport, CookieTransport, Transport, BEARER_TOKEN_URL, COOKIE_NAME};
// endregion: --- Re-exports

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use lib_core::model::manager::{UserHooks, UserManager};
use lib_core::model::store::{SqlAccessTokenStore, SqlUserStore};
use lib_core::{AppError, Config, DbPool, DbSession};
use std::sync::Arc;

/// Everything an auth handler needs, bound to the request's session.
pub struct AuthContext {
    pub manager: UserManager<SqlUserStore>,
    pub strategy: DatabaseStrategy<SqlAccessTokenStore>,
    pub backend: Arc<AuthBackend>,
}

impl<S> FromRequestParts<S> for AuthContext
where
    DbPool: FromRef<S>,
    Config: FromRef<S>,
    Arc<AuthBackend>: FromRef<S>,
    Arc<dyn UserHooks>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = DbSession::from_request_parts(parts, state).await?;
        let config = Config::from_ref(state);
        let backend = Arc::<AuthBackend>::from_ref(state);
        let hooks = <Arc<dyn UserHooks>>::from_ref(state);

        Ok(Self {
            manager: UserManager::new(SqlUserStore::new(session.clone()), hooks, config.auth_secret),
            strategy: backend.strategy(session),
            backend,
        })
    }
}
