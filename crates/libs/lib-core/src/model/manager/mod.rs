//! # User Manager
//!
//! Account lifecycle on top of a [`UserStore`]: registration, credential
//! checks, password reset, email verification, profile updates and deletion.
//!
//! Reset and verification tokens are short-lived HS256 JWTs scoped by
//! audience. Both are signed with the configured auth secret.
//!
//! ```text
//! register ──► on_after_register
//! forgot-password ──► reset token ──► on_after_forgot_password ──► reset-password
//! request-verify ──► verify token ──► on_after_request_verify ──► verify
//! ```

pub mod hooks;

pub use hooks::{LoggingUserHooks, UserHooks};

use crate::dto::{UserAdminUpdate, UserCreate};
use crate::error::{AppError, Result};
use crate::model::store::{User, UserForCreate, UserForUpdate, UserStore};
use lib_auth::pwd::{fingerprint, MIN_PASSWORD_LEN};
use lib_auth::{
    decode_purpose_token, encode_purpose_token, hash_password, verify_password, PurposeClaims,
    RESET_PASSWORD_AUDIENCE, VERIFY_USER_AUDIENCE,
};
use lib_utils::{now_utc, validate_email, validate_min_length};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Lifetime of password-reset tokens, in seconds.
pub const RESET_PASSWORD_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Lifetime of verification tokens, in seconds.
pub const VERIFICATION_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Hashed to equalize timing when a login names an unknown email.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

pub struct UserManager<S: UserStore> {
    store: S,
    hooks: Arc<dyn UserHooks>,
    reset_password_token_secret: String,
    verification_token_secret: String,
}

impl<S: UserStore> UserManager<S> {
    /// Manager whose reset and verification secrets are both `secret`.
    pub fn new(store: S, hooks: Arc<dyn UserHooks>, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            store,
            hooks,
            reset_password_token_secret: secret.clone(),
            verification_token_secret: secret,
        }
    }

    /// Parse a user id from a path segment or token subject.
    pub fn parse_id(value: &str) -> Option<Uuid> {
        Uuid::parse_str(value).ok()
    }

    // region: --- Lookups

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Surrounding whitespace is ignored, as on registration and login.
    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        self.store
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    // endregion: --- Lookups

    // region: --- Registration and Login

    /// Password policy applied on registration, reset and update.
    pub fn validate_password(&self, password: &str) -> Result<()> {
        validate_min_length(password, MIN_PASSWORD_LEN, "Password").map_err(AppError::InvalidPassword)
    }

    /// Register a new account.
    ///
    /// The account is always active, unverified and not a superuser.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidInput`] for a malformed email
    /// - [`AppError::InvalidPassword`] when the password policy rejects it
    /// - [`AppError::UserAlreadyExists`] when the email is taken (any case)
    pub async fn create(&self, data: UserCreate) -> Result<User> {
        let email = data.email.trim().to_string();
        validate_email(&email).map_err(AppError::InvalidInput)?;
        self.validate_password(&data.password)?;

        if self.store.get_by_email(&email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let hashed_password = hash_password(&data.password)?;
        // The store maps a concurrent duplicate insert to UserAlreadyExists as well
        let user = self.store.create(UserForCreate::new(email, hashed_password)).await?;

        info!("[REGISTER] User created: {}", user.id);
        self.hooks.on_after_register(&user).await;

        Ok(user)
    }

    /// Check credentials.
    ///
    /// Returns `None` for an unknown email or a wrong password. The active flag
    /// is left to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.store.get_by_email(email.trim()).await? else {
            let _ = hash_password(DUMMY_PASSWORD);
            return Ok(None);
        };

        if !verify_password(password, &user.hashed_password)? {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Stamp `last_login` after a successful login.
    pub async fn record_login(&self, user: &User) -> Result<User> {
        self.store
            .update(user, UserForUpdate::new().last_login(now_utc()))
            .await
    }

    // endregion: --- Registration and Login

    // region: --- Password Reset

    /// Issue a reset token and hand it to `on_after_forgot_password`.
    ///
    /// Inactive accounts get neither a token nor a hook call.
    pub async fn forgot_password(&self, user: &User) -> Result<()> {
        if !user.is_active {
            debug!("[FORGOT_PASSWORD] Ignored for inactive user {}", user.id);
            return Ok(());
        }

        let claims = PurposeClaims::new(
            user.id.to_string(),
            RESET_PASSWORD_AUDIENCE,
            RESET_PASSWORD_TOKEN_LIFETIME_SECS,
        )
        .with_password_fgpt(fingerprint(&user.hashed_password)?);
        let token = encode_purpose_token(&claims, &self.reset_password_token_secret)?;

        self.hooks.on_after_forgot_password(user, &token).await;
        Ok(())
    }

    /// Set a new password with a reset token.
    ///
    /// The token is single-use in practice: its fingerprint no longer matches
    /// once the password hash has changed.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<User> {
        let claims = decode_purpose_token(token, &self.reset_password_token_secret, RESET_PASSWORD_AUDIENCE)
            .map_err(|e| {
                debug!("[RESET_PASSWORD] Token rejected: {}", e);
                AppError::ResetPasswordBadToken
            })?;

        let id = Self::parse_id(&claims.sub).ok_or(AppError::ResetPasswordBadToken)?;
        let user = self.store.get(id).await?.ok_or(AppError::ResetPasswordBadToken)?;

        let fgpt = claims.password_fgpt.ok_or(AppError::ResetPasswordBadToken)?;
        // A parse failure means a forged or corrupted fingerprint
        if !verify_password(&user.hashed_password, &fgpt).unwrap_or(false) {
            return Err(AppError::ResetPasswordBadToken);
        }

        if !user.is_active {
            return Err(AppError::ResetPasswordBadToken);
        }

        self.validate_password(password)?;
        let hashed_password = hash_password(password)?;
        let user = self
            .store
            .update(&user, UserForUpdate::new().hashed_password(hashed_password))
            .await?;

        info!("[RESET_PASSWORD] Password reset for user {}", user.id);
        Ok(user)
    }

    // endregion: --- Password Reset

    // region: --- Verification

    /// Issue a verification token and hand it to `on_after_request_verify`.
    ///
    /// Inactive or already verified accounts get neither a token nor a hook call.
    pub async fn request_verify(&self, user: &User) -> Result<()> {
        if !user.is_active || user.is_verified {
            debug!("[REQUEST_VERIFY] Ignored for user {}", user.id);
            return Ok(());
        }

        let claims = PurposeClaims::new(
            user.id.to_string(),
            VERIFY_USER_AUDIENCE,
            VERIFICATION_TOKEN_LIFETIME_SECS,
        )
        .with_email(user.email.clone());
        let token = encode_purpose_token(&claims, &self.verification_token_secret)?;

        self.hooks.on_after_request_verify(user, &token).await;
        Ok(())
    }

    /// Mark the account named by a verification token as verified.
    pub async fn verify(&self, token: &str) -> Result<User> {
        let claims = decode_purpose_token(token, &self.verification_token_secret, VERIFY_USER_AUDIENCE)
            .map_err(|e| {
                debug!("[VERIFY] Token rejected: {}", e);
                AppError::VerifyUserBadToken
            })?;

        let email = claims.email.ok_or(AppError::VerifyUserBadToken)?;
        let user = self
            .store
            .get_by_email(&email)
            .await?
            .ok_or(AppError::VerifyUserBadToken)?;

        if Self::parse_id(&claims.sub) != Some(user.id) {
            return Err(AppError::VerifyUserBadToken);
        }

        if user.is_verified {
            return Err(AppError::VerifyUserAlreadyVerified);
        }

        let user = self.store.update(&user, UserForUpdate::new().is_verified(true)).await?;

        info!("[VERIFY] User verified: {}", user.id);
        Ok(user)
    }

    // endregion: --- Verification

    // region: --- Update and Delete

    /// Apply a profile update.
    ///
    /// With `safe` set (self-service) only email and password are applied.
    /// An email change clears `is_verified` unless the update sets it explicitly.
    pub async fn update(&self, user: &User, data: UserAdminUpdate, safe: bool) -> Result<User> {
        let mut update = UserForUpdate::new();

        if let Some(email) = data.email {
            let email = email.trim().to_string();
            if email != user.email {
                validate_email(&email).map_err(AppError::InvalidInput)?;
                if let Some(existing) = self.store.get_by_email(&email).await? {
                    if existing.id != user.id {
                        return Err(AppError::UserAlreadyExists);
                    }
                }
                update = update.email(email).is_verified(false);
            }
        }

        if let Some(password) = data.password {
            self.validate_password(&password)?;
            update = update.hashed_password(hash_password(&password)?);
        }

        if !safe {
            if let Some(is_active) = data.is_active {
                update = update.is_active(is_active);
            }
            if let Some(is_superuser) = data.is_superuser {
                update = update.is_superuser(is_superuser);
            }
            if let Some(is_verified) = data.is_verified {
                update = update.is_verified(is_verified);
            }
        }

        self.store.update(user, update).await
    }

    pub async fn delete(&self, user: &User) -> Result<()> {
        self.store.delete(user).await?;
        info!("[DELETE] User deleted: {}", user.id);
        Ok(())
    }

    // endregion: --- Update and Delete
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::test_support::setup_test_db;
    use crate::model::store::{DbSession, SqlUserStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const SECRET: &str = "manager-test-secret-at-least-32-chars!";

    #[derive(Default)]
    struct RecordingHooks {
        registered: AtomicUsize,
        forgot: AtomicUsize,
        verify_requested: AtomicUsize,
        last_token: Mutex<Option<String>>,
    }

    impl RecordingHooks {
        fn counts(&self) -> (usize, usize, usize) {
            (
                self.registered.load(Ordering::SeqCst),
                self.forgot.load(Ordering::SeqCst),
                self.verify_requested.load(Ordering::SeqCst),
            )
        }

        fn last_token(&self) -> String {
            self.last_token
                .lock()
                .unwrap()
                .clone()
                .expect("A token should have been issued")
        }
    }

    #[async_trait]
    impl UserHooks for RecordingHooks {
        async fn on_after_register(&self, _user: &User) {
            self.registered.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_after_forgot_password(&self, _user: &User, token: &str) {
            self.forgot.fetch_add(1, Ordering::SeqCst);
            *self.last_token.lock().unwrap() = Some(token.to_string());
        }

        async fn on_after_request_verify(&self, _user: &User, token: &str) {
            self.verify_requested.fetch_add(1, Ordering::SeqCst);
            *self.last_token.lock().unwrap() = Some(token.to_string());
        }
    }

    async fn setup() -> (UserManager<SqlUserStore>, Arc<RecordingHooks>) {
        let pool = setup_test_db().await;
        let session = DbSession::open(&pool).await.unwrap();
        let hooks = Arc::new(RecordingHooks::default());
        let manager = UserManager::new(SqlUserStore::new(session), hooks.clone(), SECRET);
        (manager, hooks)
    }

    fn user_create(email: &str) -> UserCreate {
        UserCreate {
            email: email.to_string(),
            password: "correct-horse".to_string(),
        }
    }

    // ========== Registration ==========

    #[tokio::test]
    async fn test_create_user_defaults_and_hook() {
        let (manager, hooks) = setup().await;

        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert!(!user.is_verified);
        assert_ne!(user.hashed_password, "correct-horse");
        assert_eq!(hooks.counts(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let (manager, hooks) = setup().await;

        manager.create(user_create("alice@example.com")).await.unwrap();
        let result = manager.create(user_create("ALICE@example.com")).await;

        assert!(matches!(result, Err(AppError::UserAlreadyExists)));
        assert_eq!(hooks.counts(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_create_rejects_weak_password_and_bad_email() {
        let (manager, hooks) = setup().await;

        let weak = UserCreate {
            email: "alice@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(matches!(manager.create(weak).await, Err(AppError::InvalidPassword(_))));
        assert!(matches!(
            manager.create(user_create("not-an-email")).await,
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(hooks.counts(), (0, 0, 0));
    }

    // ========== Authentication ==========

    #[tokio::test]
    async fn test_authenticate() {
        let (manager, hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        let ok = manager.authenticate("Alice@Example.com", "correct-horse").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        assert!(manager.authenticate("alice@example.com", "wrong-horse").await.unwrap().is_none());
        assert!(manager.authenticate("nobody@example.com", "correct-horse").await.unwrap().is_none());

        let logged_in = manager.record_login(&user).await.unwrap();
        assert!(logged_in.last_login.is_some());

        // Login is not a lifecycle hook
        assert_eq!(hooks.counts(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_get_by_email_trims_whitespace() {
        let (manager, _hooks) = setup().await;
        let user = manager.create(user_create(" alice@example.com ")).await.unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(manager.get_by_email("  alice@example.com\n").await.unwrap().id, user.id);
        assert!(matches!(
            manager.get_by_email("  nobody@example.com ").await,
            Err(AppError::NotFound(_))
        ));
    }

    // ========== Password Reset ==========

    #[tokio::test]
    async fn test_forgot_and_reset_password() {
        let (manager, hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        manager.forgot_password(&user).await.unwrap();
        assert_eq!(hooks.counts(), (1, 1, 0));
        let token = hooks.last_token();

        let updated = manager.reset_password(&token, "brand-new-secret").await.unwrap();
        assert!(manager.authenticate("alice@example.com", "brand-new-secret").await.unwrap().is_some());
        assert!(manager.authenticate("alice@example.com", "correct-horse").await.unwrap().is_none());
        assert_eq!(updated.id, user.id);

        // The password changed, so the same token is now stale
        let reused = manager.reset_password(&token, "another-new-secret").await;
        assert!(matches!(reused, Err(AppError::ResetPasswordBadToken)));
    }

    #[tokio::test]
    async fn test_forgot_password_inactive_user_is_silent() {
        let (manager, hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();
        let inactive = manager
            .update(&user, UserAdminUpdate { is_active: Some(false), ..Default::default() }, false)
            .await
            .unwrap();

        manager.forgot_password(&inactive).await.unwrap();
        assert_eq!(hooks.counts(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_bad_tokens() {
        let (manager, hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        assert!(matches!(
            manager.reset_password("garbage", "brand-new-secret").await,
            Err(AppError::ResetPasswordBadToken)
        ));

        // A verification token must not work as a reset token
        manager.request_verify(&user).await.unwrap();
        let verify_token = hooks.last_token();
        assert!(matches!(
            manager.reset_password(&verify_token, "brand-new-secret").await,
            Err(AppError::ResetPasswordBadToken)
        ));

        manager.forgot_password(&user).await.unwrap();
        let reset_token = hooks.last_token();
        assert!(matches!(
            manager.reset_password(&reset_token, "short").await,
            Err(AppError::InvalidPassword(_))
        ));
    }

    // ========== Verification ==========

    #[tokio::test]
    async fn test_request_verify_and_verify() {
        let (manager, hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        manager.request_verify(&user).await.unwrap();
        assert_eq!(hooks.counts(), (1, 0, 1));
        let token = hooks.last_token();

        let verified = manager.verify(&token).await.unwrap();
        assert!(verified.is_verified);

        assert!(matches!(manager.verify(&token).await, Err(AppError::VerifyUserAlreadyVerified)));

        // Already verified: no new token, no hook
        manager.request_verify(&verified).await.unwrap();
        assert_eq!(hooks.counts(), (1, 0, 1));
    }

    #[tokio::test]
    async fn test_verify_rejects_token_after_email_change() {
        let (manager, hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        manager.request_verify(&user).await.unwrap();
        let token = hooks.last_token();

        let update = UserAdminUpdate { email: Some("alice2@example.com".to_string()), ..Default::default() };
        manager.update(&user, update, true).await.unwrap();

        assert!(matches!(manager.verify(&token).await, Err(AppError::VerifyUserBadToken)));
        assert!(matches!(manager.verify("garbage").await, Err(AppError::VerifyUserBadToken)));
    }

    // ========== Update and Delete ==========

    #[tokio::test]
    async fn test_safe_update_ignores_privilege_flags() {
        let (manager, _hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        let update = UserAdminUpdate {
            is_superuser: Some(true),
            is_verified: Some(true),
            ..Default::default()
        };
        let same = manager.update(&user, update.clone(), true).await.unwrap();
        assert!(!same.is_superuser);
        assert!(!same.is_verified);

        let promoted = manager.update(&user, update, false).await.unwrap();
        assert!(promoted.is_superuser);
        assert!(promoted.is_verified);
    }

    #[tokio::test]
    async fn test_update_email_conflict_and_reverification() {
        let (manager, _hooks) = setup().await;
        manager.create(user_create("taken@example.com")).await.unwrap();
        let user = manager.create(user_create("alice@example.com")).await.unwrap();
        let user = manager
            .update(&user, UserAdminUpdate { is_verified: Some(true), ..Default::default() }, false)
            .await
            .unwrap();

        let taken = UserAdminUpdate { email: Some("TAKEN@example.com".to_string()), ..Default::default() };
        assert!(matches!(manager.update(&user, taken, true).await, Err(AppError::UserAlreadyExists)));

        let moved = UserAdminUpdate { email: Some("new@example.com".to_string()), ..Default::default() };
        let moved = manager.update(&user, moved, true).await.unwrap();
        assert_eq!(moved.email, "new@example.com");
        assert!(!moved.is_verified);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (manager, _hooks) = setup().await;
        let user = manager.create(user_create("alice@example.com")).await.unwrap();

        manager.delete(&user).await.unwrap();

        assert!(matches!(manager.get(user.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(manager.get_by_email("alice@example.com").await, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(UserManager::<SqlUserStore>::parse_id(&id.to_string()), Some(id));
        assert_eq!(UserManager::<SqlUserStore>::parse_id("42"), None);
    }
}
