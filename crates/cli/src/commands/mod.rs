//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use kedai_storefront::db::{self, RepositoryError};
use kedai_storefront::models::ValidationError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A seed entry failed validation.
    #[error("Product #{index} ({name}): {source}")]
    InvalidSeed {
        index: usize,
        name: String,
        source: ValidationError,
    },

    #[error("No user named {0}")]
    UserNotFound(String),
}

/// Connect to the database named by `KEDAI_DATABASE_URL` (or `DATABASE_URL`).
pub(crate) async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("KEDAI_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("KEDAI_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
