//! # User Handlers
//!
//! - `GET /users/me`, `PATCH /users/me` - the authenticated, active user
//! - `GET|PATCH|DELETE /users/{id}` - any user, superusers only
//! - `GET /authenticated-route` - greeting for the active user
//!
//! Self-service updates only touch email and password. Superuser updates may
//! also change the account flags.

use crate::auth::{AuthContext, CurrentActiveUser, CurrentSuperuser};
use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use lib_core::dto::{MessageResponse, UserAdminUpdate, UserRead, UserUpdate};
use lib_core::model::manager::UserManager;
use lib_core::model::store::{SqlUserStore, User};
use lib_core::{AppError, Result};
use tracing::info;

pub async fn me(current: CurrentActiveUser) -> Json<UserRead> {
    Json(UserRead::from(current.user))
}

pub async fn update_me(
    ctx: AuthContext,
    current: CurrentActiveUser,
    Json(req): Json<UserUpdate>,
) -> Result<Json<UserRead>> {
    let user = ctx.manager.update(&current.user, UserAdminUpdate::from(req), true).await?;
    Ok(Json(UserRead::from(user)))
}

pub async fn get_user(
    ctx: AuthContext,
    _superuser: CurrentSuperuser,
    Path(id): Path<String>,
) -> Result<Json<UserRead>> {
    let user = find_user(&ctx.manager, &id).await?;
    Ok(Json(UserRead::from(user)))
}

pub async fn update_user(
    ctx: AuthContext,
    superuser: CurrentSuperuser,
    Path(id): Path<String>,
    Json(req): Json<UserAdminUpdate>,
) -> Result<Json<UserRead>> {
    let user = find_user(&ctx.manager, &id).await?;
    let user = ctx.manager.update(&user, req, false).await?;

    info!("[USERS] User {} updated by superuser {}", user.id, superuser.user.id);
    Ok(Json(UserRead::from(user)))
}

pub async fn delete_user(
    ctx: AuthContext,
    superuser: CurrentSuperuser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let user = find_user(&ctx.manager, &id).await?;
    ctx.manager.delete(&user).await?;

    info!("[USERS] User {} deleted by superuser {}", user.id, superuser.user.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn authenticated_route(current: CurrentActiveUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Hello {}!", current.user.email),
    })
}

/// Malformed and unknown ids are both `404`.
async fn find_user(manager: &UserManager<SqlUserStore>, id: &str) -> Result<User> {
    let id = UserManager::<SqlUserStore>::parse_id(id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    manager.get(id).await
}
