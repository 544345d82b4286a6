//! # User Repository
//!
//! Provides database access layer for user-related operations.
//!
//! Every method is generic over the sqlx executor, so the same queries run
//! against the pool (tools, tests) or against a request's [`DbSession`](super::DbSession)
//! connection.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_pool, UserRepository, UserForCreate};
//! # async fn example() -> Result<(), sqlx::Error> {
//! let pool = create_pool("sqlite:test.sqlite").await?;
//!
//! let user = UserRepository::create(
//!     &pool,
//!     UserForCreate::new("alice@example.com".to_string(), "argon2-hash".to_string()),
//! ).await?;
//!
//! let found = UserRepository::find_by_email(&pool, "ALICE@example.com").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use super::models::{User, UserForCreate, UserForUpdate};
use lib_utils::now_utc;
use sqlx::{query_as, Executor, Sqlite};
use uuid::Uuid;

/// User repository for database operations.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by id.
    pub async fn find_by_id<'e, E>(db: E, id: Uuid) -> Result<Option<User>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by their email address.
    ///
    /// The `email` column is declared `COLLATE NOCASE`, so the lookup ignores ASCII case.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found with matching email
    /// * `Ok(None)` - No user found with that email
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_email<'e, E>(db: E, email: &str) -> Result<Option<User>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db)
            .await
    }

    /// Create a new user with a freshly generated UUID v4 id.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if:
    /// - Email already exists (UNIQUE constraint violation)
    /// - Database connection fails
    pub async fn create<'e, E>(db: E, user_data: UserForCreate) -> Result<User, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, User>(
            "INSERT INTO users (id, email, hashed_password, is_active, is_superuser, is_verified, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user_data.email)
        .bind(&user_data.hashed_password)
        .bind(user_data.is_active)
        .bind(user_data.is_superuser)
        .bind(user_data.is_verified)
        .bind(now_utc())
        .fetch_one(db)
        .await
    }

    /// Update an existing user using `UserForUpdate`.
    ///
    /// Only fields that are `Some` in `user_data` will be updated.
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if no user has this id.
    pub async fn update<'e, E>(db: E, id: Uuid, user_data: UserForUpdate) -> Result<User, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if user_data.is_empty() {
            // No updates, just return the existing user
            return Self::find_by_id(db, id)
                .await?
                .ok_or(sqlx::Error::RowNotFound);
        }

        // Build update query dynamically
        let mut updates = Vec::new();

        if user_data.email.is_some() {
            updates.push("email = ?");
        }
        if user_data.hashed_password.is_some() {
            updates.push("hashed_password = ?");
        }
        if user_data.is_active.is_some() {
            updates.push("is_active = ?");
        }
        if user_data.is_superuser.is_some() {
            updates.push("is_superuser = ?");
        }
        if user_data.is_verified.is_some() {
            updates.push("is_verified = ?");
        }
        if user_data.last_login.is_some() {
            updates.push("last_login = ?");
        }

        let query_str = format!("UPDATE users SET {} WHERE id = ? RETURNING *", updates.join(", "));

        // Bind order must follow the column order above
        let mut query = query_as::<_, User>(&query_str);

        if let Some(ref email) = user_data.email {
            query = query.bind(email);
        }
        if let Some(ref hashed_password) = user_data.hashed_password {
            query = query.bind(hashed_password);
        }
        if let Some(is_active) = user_data.is_active {
            query = query.bind(is_active);
        }
        if let Some(is_superuser) = user_data.is_superuser {
            query = query.bind(is_superuser);
        }
        if let Some(is_verified) = user_data.is_verified {
            query = query.bind(is_verified);
        }
        if let Some(last_login) = user_data.last_login {
            query = query.bind(last_login);
        }

        query.bind(id).fetch_one(db).await
    }

    /// Delete a user. Their access tokens go with them (`ON DELETE CASCADE`).
    ///
    /// Returns the number of deleted rows (0 or 1).
    pub async fn delete<'e, E>(db: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
