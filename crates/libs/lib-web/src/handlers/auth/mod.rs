//! # Authentication Handlers
//!
//! HTTP request handlers for the `/auth/*` endpoints.
//!
//! ## Overview
//!
//! - `POST /auth/register` - create an account
//! - `POST /auth/cookie/login` - form login, sets the `userauth` cookie
//! - `POST /auth/cookie/logout` - destroys the token, clears the cookie
//! - `POST /auth/forgot-password` - issue a reset token (always `202`)
//! - `POST /auth/reset-password` - set a new password with a reset token
//! - `POST /auth/request-verify-token` - issue a verification token (always `202`)
//! - `POST /auth/verify` - mark the account as verified
//!
//! Forgot-password and request-verify answer the same way whether or not the
//! email exists, so they cannot be used to enumerate accounts.

use crate::auth::{AuthContext, CurrentActiveUser};
use axum::{
    extract::{Form, Json},
    http::StatusCode,
    response::Response,
};
use lib_core::dto::{
    ForgotPasswordRequest, LoginForm, RequestVerifyTokenRequest, ResetPasswordRequest, UserCreate,
    UserRead, VerifyRequest,
};
use lib_core::{AppError, Result};
use tower_cookies::Cookies;
use tracing::{debug, info, instrument, warn};

/// Register handler - creates a new account.
///
/// # Returns
///
/// * `201 Created` with the new [`UserRead`]
/// * `400` malformed email or rejected password
/// * `409` email already registered
#[instrument(skip_all, fields(email = %req.email))]
pub async fn register(ctx: AuthContext, Json(req): Json<UserCreate>) -> Result<(StatusCode, Json<UserRead>)> {
    info!("[REGISTER] New registration request");

    let user = ctx.manager.create(req).await.map_err(|e| {
        warn!("[REGISTER] Rejected: {}", e);
        e
    })?;

    Ok((StatusCode::CREATED, Json(UserRead::from(user))))
}

/// Login handler - checks the form credentials and issues a session cookie.
///
/// Unknown email, wrong password and inactive account all answer the same
/// `400 LOGIN_BAD_CREDENTIALS`.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(ctx: AuthContext, cookies: Cookies, Form(form): Form<LoginForm>) -> Result<Response> {
    info!("[LOGIN] Login attempt");

    let user = match ctx.manager.authenticate(&form.username, &form.password).await? {
        Some(user) if user.is_active => user,
        Some(user) => {
            warn!("[LOGIN] Inactive account: {}", user.id);
            return Err(AppError::BadCredentials);
        }
        None => {
            warn!("[LOGIN] Invalid credentials");
            return Err(AppError::BadCredentials);
        }
    };

    let user = ctx.manager.record_login(&user).await?;
    let response = ctx.backend.login(&ctx.strategy, &user, &cookies).await?;

    info!("[LOGIN] User authenticated: {}", user.id);
    Ok(response)
}

/// Logout handler - destroys the presented token and clears the cookie.
pub async fn logout(ctx: AuthContext, cookies: Cookies, current: CurrentActiveUser) -> Result<Response> {
    ctx.backend
        .logout(&ctx.strategy, &current.user, &current.token, &cookies)
        .await
}

/// Forgot-password handler. Always `202 Accepted`.
pub async fn forgot_password(ctx: AuthContext, Json(req): Json<ForgotPasswordRequest>) -> Result<StatusCode> {
    match ctx.manager.get_by_email(&req.email).await {
        Ok(user) => ctx.manager.forgot_password(&user).await?,
        Err(AppError::NotFound(_)) => debug!("[FORGOT_PASSWORD] Unknown email"),
        Err(e) => return Err(e),
    }

    Ok(StatusCode::ACCEPTED)
}

/// Reset-password handler.
///
/// # Returns
///
/// * `200 OK` with the updated [`UserRead`]
/// * `400 RESET_PASSWORD_BAD_TOKEN` bad, expired or already used token
/// * `400 INVALID_PASSWORD` rejected password
pub async fn reset_password(ctx: AuthContext, Json(req): Json<ResetPasswordRequest>) -> Result<Json<UserRead>> {
    let user = ctx.manager.reset_password(&req.token, &req.password).await?;
    Ok(Json(UserRead::from(user)))
}

/// Request-verify-token handler. Always `202 Accepted`.
pub async fn request_verify_token(
    ctx: AuthContext,
    Json(req): Json<RequestVerifyTokenRequest>,
) -> Result<StatusCode> {
    match ctx.manager.get_by_email(&req.email).await {
        Ok(user) => ctx.manager.request_verify(&user).await?,
        Err(AppError::NotFound(_)) => debug!("[REQUEST_VERIFY] Unknown email"),
        Err(e) => return Err(e),
    }

    Ok(StatusCode::ACCEPTED)
}

/// Verify handler.
///
/// # Returns
///
/// * `200 OK` with the verified [`UserRead`]
/// * `400 VERIFY_USER_BAD_TOKEN` bad or expired token
/// * `400 VERIFY_USER_ALREADY_VERIFIED`
pub async fn verify(ctx: AuthContext, Json(req): Json<VerifyRequest>) -> Result<Json<UserRead>> {
    let user = ctx.manager.verify(&req.token).await?;
    Ok(Json(UserRead::from(user)))
}

#[cfg(test)]
mod tests;
