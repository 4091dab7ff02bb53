//! Database migration command.
//!
//! Applies the SQL files in `crates/storefront/migrations/`, which are
//! embedded at build time.
//!
//! ```bash
//! kedai-cli migrate
//! ```

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
