//! # Purge Tokens Utility
//!
//! Deletes access tokens older than the session lifetime.
//!
//! Expired tokens are already rejected at request time; this only reclaims
//! the rows. Live sessions are never touched.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package purge-tokens --bin purge_tokens
//! cargo run --package purge-tokens --bin purge_tokens -- --yes   # no prompt
//! ```
//!
//! The program will:
//! 1. Connect to the database named by `DATABASE_URL`
//! 2. Count expired tokens
//! 3. Ask for confirmation (unless `--yes`)
//! 4. Delete them and report the number deleted

use chrono::Duration;
use lib_auth::ACCESS_TOKEN_LIFETIME_SECS;
use lib_core::model::store::AccessTokenRepository;
use lib_core::{create_db_and_tables, create_pool, Config};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let assume_yes = std::env::args().skip(1).any(|arg| arg == "--yes" || arg == "-y");

    println!("============================================");
    println!("  Purge Expired Access Tokens");
    println!("============================================");
    println!();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("Connecting to {}...", config.database_url);
    let pool = create_pool(&config.database_url).await?;
    create_db_and_tables(&pool).await?;
    println!("Connected successfully.");
    println!();

    let cutoff = chrono::Utc::now() - Duration::seconds(ACCESS_TOKEN_LIFETIME_SECS);
    let expired = AccessTokenRepository::count_created_before(&pool, cutoff).await?;

    if expired == 0 {
        println!("No expired tokens found.");
        println!("Nothing to delete.");
        return Ok(());
    }

    println!("Found {} token(s) created before {}.", expired, cutoff.to_rfc3339());
    println!();

    if !assume_yes {
        print!("Delete them? (yes/no): ");
        io::stdout().flush()?;

        let mut confirmation = String::new();
        io::stdin().read_line(&mut confirmation)?;
        let confirmation = confirmation.trim().to_lowercase();

        if confirmation != "yes" && confirmation != "y" {
            println!("Operation cancelled.");
            return Ok(());
        }
        println!();
    }

    println!("Deleting expired tokens...");
    let deleted = AccessTokenRepository::delete_created_before(&pool, cutoff).await?;

    println!("Successfully deleted {} token(s).", deleted);

    Ok(())
}
