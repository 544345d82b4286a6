//! # Store Adapters
//!
//! Storage capability sets used by the user manager ([`UserStore`]) and the
//! database token strategy ([`AccessTokenStore`]), with SQLite implementations
//! bound to a request's [`DbSession`]. The adapters only translate calls into
//! repository queries and map database errors onto [`AppError`].

use super::models::{AccessToken, AccessTokenForCreate, User, UserForCreate, UserForUpdate};
use super::{AccessTokenRepository, DbSession, UserRepository};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use uuid::Uuid;

// region: --- Traits

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    /// Case-insensitive lookup.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// # Errors
    ///
    /// [`AppError::UserAlreadyExists`] when the email is taken.
    async fn create(&self, data: UserForCreate) -> Result<User>;

    /// # Errors
    ///
    /// [`AppError::UserAlreadyExists`] when changing to a taken email.
    async fn update(&self, user: &User, data: UserForUpdate) -> Result<User>;

    async fn delete(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait AccessTokenStore: Send + Sync {
    /// Token row regardless of age. Expiry is the caller's decision.
    async fn get_by_token(&self, token: &str) -> Result<Option<AccessToken>>;

    async fn create(&self, data: AccessTokenForCreate) -> Result<AccessToken>;

    async fn delete(&self, token: &AccessToken) -> Result<()>;
}

// endregion: --- Traits

// region: --- SQLite Adapters

fn map_unique_violation(err: sqlx::Error) -> AppError {
    let is_unique = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        AppError::UserAlreadyExists
    } else {
        AppError::from(err)
    }
}

#[derive(Clone, Debug)]
pub struct SqlUserStore {
    session: DbSession,
}

impl SqlUserStore {
    pub fn new(session: DbSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl UserStore for SqlUserStore {
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let mut conn = self.session.lock().await;
        Ok(UserRepository::find_by_id(&mut **conn, id).await?)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = self.session.lock().await;
        Ok(UserRepository::find_by_email(&mut **conn, email).await?)
    }

    async fn create(&self, data: UserForCreate) -> Result<User> {
        let mut conn = self.session.lock().await;
        UserRepository::create(&mut **conn, data)
            .await
            .map_err(map_unique_violation)
    }

    async fn update(&self, user: &User, data: UserForUpdate) -> Result<User> {
        let mut conn = self.session.lock().await;
        UserRepository::update(&mut **conn, user.id, data)
            .await
            .map_err(map_unique_violation)
    }

    async fn delete(&self, user: &User) -> Result<()> {
        let mut conn = self.session.lock().await;
        UserRepository::delete(&mut **conn, user.id).await?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SqlAccessTokenStore {
    session: DbSession,
}

impl SqlAccessTokenStore {
    pub fn new(session: DbSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl AccessTokenStore for SqlAccessTokenStore {
    async fn get_by_token(&self, token: &str) -> Result<Option<AccessToken>> {
        let mut conn = self.session.lock().await;
        Ok(AccessTokenRepository::find_by_token(&mut **conn, token).await?)
    }

    async fn create(&self, data: AccessTokenForCreate) -> Result<AccessToken> {
        let mut conn = self.session.lock().await;
        Ok(AccessTokenRepository::create(&mut **conn, data).await?)
    }

    async fn delete(&self, token: &AccessToken) -> Result<()> {
        let mut conn = self.session.lock().await;
        AccessTokenRepository::delete(&mut **conn, &token.token).await?;
        Ok(())
    }
}

// endregion: --- SQLite Adapters
