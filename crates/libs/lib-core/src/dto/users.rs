//! # User Data Transfer Objects
//!
//! Public user representation and the create/update payloads.
//!
//! ```text
//! {
//!   "id": "6f0c1b0e-4a53-4d4f-9a0a-2b8d2f7c9e11",
//!   "email": "alice@example.com",
//!   "is_active": true,
//!   "is_superuser": false,
//!   "is_verified": false
//! }
//! ```

use crate::model::store::models::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRead {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
        }
    }
}

/// Registration payload.
///
/// Privilege flags sent by clients are ignored: registration always creates
/// an active, unverified, non-superuser account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
}

/// Self-service update (`PATCH /users/me`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Superuser update (`PATCH /users/{id}`), may also change account flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAdminUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

impl From<UserUpdate> for UserAdminUpdate {
    fn from(update: UserUpdate) -> Self {
        Self {
            email: update.email,
            password: update.password,
            ..Default::default()
        }
    }
}
