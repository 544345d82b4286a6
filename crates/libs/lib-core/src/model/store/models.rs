use chrono::{DateTime, Utc};
use lib_utils::now_utc;
use sqlx::FromRow;
use uuid::Uuid;

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Data structure for creating a new user.
///
/// Password must be hashed before creating.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

impl UserForCreate {
    /// Create an active, unverified, non-superuser account.
    pub fn new(email: String, hashed_password: String) -> Self {
        Self {
            email,
            hashed_password,
            is_active: true,
            is_superuser: false,
            is_verified: false,
        }
    }
}

/// Data structure for updating an existing user.
///
/// All fields are optional - only provided fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UserForUpdate {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
    pub last_login: Option<DateTime<Utc>>,
}

impl UserForUpdate {
    /// Create a new empty `UserForUpdate` instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn hashed_password(mut self, hashed_password: String) -> Self {
        self.hashed_password = Some(hashed_password);
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = Some(is_superuser);
        self
    }

    pub fn is_verified(mut self, is_verified: bool) -> Self {
        self.is_verified = Some(is_verified);
        self
    }

    pub fn last_login(mut self, at: DateTime<Utc>) -> Self {
        self.last_login = Some(at);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.hashed_password.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
            && self.is_verified.is_none()
            && self.last_login.is_none()
    }
}

/// Access token row: an opaque session key owned by one user.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AccessTokenForCreate {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl AccessTokenForCreate {
    /// Token issued now.
    pub fn new(token: String, user_id: Uuid) -> Self {
        Self {
            token,
            user_id,
            created_at: now_utc(),
        }
    }
}
