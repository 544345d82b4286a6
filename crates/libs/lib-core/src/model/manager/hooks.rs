//! # Lifecycle Hooks
//!
//! Callbacks fired by [`UserManager`](super::UserManager) after registration,
//! forgot-password and request-verify. The default implementation only logs;
//! delivering the tokens (email, SMS, ...) is left to a custom implementation.

use crate::model::store::User;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait UserHooks: Send + Sync {
    /// A new account was stored.
    async fn on_after_register(&self, user: &User);

    /// A password-reset token was issued for an active account.
    async fn on_after_forgot_password(&self, user: &User, token: &str);

    /// A verification token was issued for an active, unverified account.
    async fn on_after_request_verify(&self, user: &User, token: &str);
}

/// Hooks that emit one log line per event and do nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingUserHooks;

#[async_trait]
impl UserHooks for LoggingUserHooks {
    async fn on_after_register(&self, user: &User) {
        info!("[HOOK] User {} has registered.", user.id);
    }

    async fn on_after_forgot_password(&self, user: &User, token: &str) {
        info!("[HOOK] User {} has forgot their password. Reset token: {}", user.id, token);
    }

    async fn on_after_request_verify(&self, user: &User, token: &str) {
        info!("[HOOK] Verification requested for user {}. Verification token: {}", user.id, token);
    }
}
