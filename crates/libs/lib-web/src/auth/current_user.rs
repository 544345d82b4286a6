//! # Current User Extractors
//!
//! Resolve the request's token through the backend, or reject.
//!
//! | extractor | rejects with |
//! |-----------|--------------|
//! | [`CurrentUser`] | `401` no token, malformed, unknown, expired, user gone |
//! | [`CurrentActiveUser`] | `401` as above, or inactive user |
//! | [`CurrentSuperuser`] | as above, then `403` when not a superuser |

use super::{AuthBackend, AuthContext};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use lib_core::model::manager::UserHooks;
use lib_core::model::store::User;
use lib_core::{AppError, Config, DbPool};
use std::sync::Arc;
use tracing::debug;

/// Authenticated user, active or not, with the token that proved it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct CurrentActiveUser {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct CurrentSuperuser {
    pub user: User,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    DbPool: FromRef<S>,
    Config: FromRef<S>,
    Arc<AuthBackend>: FromRef<S>,
    Arc<dyn UserHooks>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = AuthContext::from_request_parts(parts, state).await?;

        let Some(token) = ctx.backend.transport.read_token(parts) else {
            debug!("[AUTH] No token presented");
            return Err(AppError::Unauthorized);
        };

        let user = ctx
            .strategy
            .read_token(Some(&token), &ctx.manager)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(Self { user, token })
    }
}

impl<S> FromRequestParts<S> for CurrentActiveUser
where
    DbPool: FromRef<S>,
    Config: FromRef<S>,
    Arc<AuthBackend>: FromRef<S>,
    Arc<dyn UserHooks>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser { user, token } = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_active {
            debug!("[AUTH] Inactive user {}", user.id);
            return Err(AppError::Unauthorized);
        }

        Ok(Self { user, token })
    }
}

impl<S> FromRequestParts<S> for CurrentSuperuser
where
    DbPool: FromRef<S>,
    Config: FromRef<S>,
    Arc<AuthBackend>: FromRef<S>,
    Arc<dyn UserHooks>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentActiveUser { user, .. } = CurrentActiveUser::from_request_parts(parts, state).await?;

        if !user.is_superuser {
            debug!("[AUTH] User {} is not a superuser", user.id);
            return Err(AppError::Forbidden);
        }

        Ok(Self { user })
    }
}
