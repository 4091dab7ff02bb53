//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `products` - The catalog
//! - `users` - Store users (customers and admins)
//! - `orders` - Placed orders, with the customer record inlined
//! - `order_items` - Order lines; `product_id` is nullable so deleted
//!   products do not erase order history
//! - `tower_sessions.session` - Session records (including each browser's cart)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p kedai-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::{ProductFilter, ProductRepository};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to [`RepositoryError::Conflict`].
    pub(crate) fn from_write(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
