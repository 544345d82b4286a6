//! # Database Store
//!
//! Connection pool, schema initialization, per-request sessions, repositories
//! and the store adapters consumed by the user manager and token strategy.

// region: --- Modules
pub mod adapters;
pub mod access_token_repository;
pub mod models;
pub mod session;
pub mod user_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use access_token_repository::AccessTokenRepository;
pub use adapters::{AccessTokenStore, SqlAccessTokenStore, SqlUserStore, UserStore};
pub use models::{AccessToken, AccessTokenForCreate, User, UserForCreate, UserForUpdate};
pub use session::DbSession;
pub use user_repository::UserRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use tracing::{debug, info};

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Schema statements. Every statement is guarded with `IF NOT EXISTS`.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BLOB PRIMARY KEY NOT NULL,
        email TEXT NOT NULL COLLATE NOCASE UNIQUE,
        hashed_password TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        is_superuser BOOLEAN NOT NULL DEFAULT 0,
        is_verified BOOLEAN NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL,
        last_login TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS access_tokens (
        token TEXT PRIMARY KEY NOT NULL,
        user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMP NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_access_tokens_user_id ON access_tokens(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_access_tokens_created_at ON access_tokens(created_at)",
];

/// Create a new SQLite connection pool.
///
/// The database file is created if missing. Foreign keys are enforced so an
/// access token can never outlive its user.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Create all tables and indexes that do not exist yet.
///
/// Idempotent: safe to run at every process start, never drops or alters data.
pub async fn create_db_and_tables(pool: &DbPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!("[DB] Schema ensured ({} statements)", SCHEMA.len());
    info!("[DB] Tables ready");
    Ok(())
}
// endregion: --- Types and Functions
