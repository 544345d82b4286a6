//! # Access Token Repository
//!
//! Rows of the `access_tokens` table: opaque token, owner, creation time.
//! Expiry is never stored; it is derived from `created_at` by the strategy.

use super::models::{AccessToken, AccessTokenForCreate};
use chrono::{DateTime, Utc};
use sqlx::{query_as, Executor, Sqlite};

pub struct AccessTokenRepository;

impl AccessTokenRepository {
    /// Look up a token row, expired or not.
    pub async fn find_by_token<'e, E>(db: E, token: &str) -> Result<Option<AccessToken>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(db)
            .await
    }

    /// Insert a token.
    ///
    /// # Errors
    ///
    /// Fails on a foreign-key violation when the user does not exist.
    pub async fn create<'e, E>(db: E, data: AccessTokenForCreate) -> Result<AccessToken, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        query_as::<_, AccessToken>(
            "INSERT INTO access_tokens (token, user_id, created_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(&data.token)
        .bind(data.user_id)
        .bind(data.created_at)
        .fetch_one(db)
        .await
    }

    /// Delete one token. Returns the number of deleted rows (0 or 1).
    pub async fn delete<'e, E>(db: E, token: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM access_tokens WHERE token = ?")
            .bind(token)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count tokens created strictly before `cutoff`.
    pub async fn count_created_before<'e, E>(db: E, cutoff: DateTime<Utc>) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM access_tokens WHERE created_at < ?")
            .bind(cutoff)
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// Delete tokens created strictly before `cutoff`. Returns the number deleted.
    pub async fn delete_created_before<'e, E>(db: E, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM access_tokens WHERE created_at < ?")
            .bind(cutoff)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
