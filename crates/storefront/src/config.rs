//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KEDAI_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `KEDAI_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `KEDAI_HOST` - Bind address (default: 127.0.0.1)
//! - `KEDAI_PORT` - Listen port (default: 3000)
//! - `KEDAI_UPLOAD_DIR` - Directory for product images (default: uploads)
//! - `KEDAI_MAX_UPLOAD_BYTES` - Largest accepted image (default: 5 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Where uploaded product images are written
    pub upload_dir: PathBuf,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. "production")
    pub environment: Option<String>,
    /// Fraction of error events to send
    pub sample_rate: f32,
    /// Fraction of transactions to trace
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup: &lookup };

        let database_url = env
            .optional("KEDAI_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("KEDAI_DATABASE_URL".to_string()))?;

        let base_url = env.required("KEDAI_BASE_URL")?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidEnvVar(
                "KEDAI_BASE_URL".to_string(),
                "must start with http:// or https://".to_string(),
            ));
        }

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.parsed_or("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: env.parsed_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        };
        validate_rate(sentry.sample_rate, "SENTRY_SAMPLE_RATE")?;
        validate_rate(sentry.traces_sample_rate, "SENTRY_TRACES_SAMPLE_RATE")?;

        Ok(Self {
            database_url,
            host: env.parsed_or("KEDAI_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parsed_or("KEDAI_PORT", 3000)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_dir: env
                .optional("KEDAI_UPLOAD_DIR")
                .map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            max_upload_bytes: env.parsed_or("KEDAI_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

fn validate_rate(rate: f32, key: &str) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("KEDAI_DATABASE_URL", "postgres://localhost/kedai"),
        ("KEDAI_BASE_URL", "http://localhost:3000/"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.sentry.dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fly/kedai"),
            ("KEDAI_BASE_URL", "https://toko.example"),
        ])
        .unwrap();

        assert_eq!(config.database_url.expose_secret(), "postgres://fly/kedai");
        assert!(config.is_secure());
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("KEDAI_BASE_URL", "http://localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "KEDAI_DATABASE_URL"));

        let err = load(&[("KEDAI_DATABASE_URL", "postgres://x")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "KEDAI_BASE_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("KEDAI_PORT", "not-a-port"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));

        let mut vars = MINIMAL.to_vec();
        vars.push(("SENTRY_SAMPLE_RATE", "1.5"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(..))));

        let err = load(&[
            ("KEDAI_DATABASE_URL", "postgres://x"),
            ("KEDAI_BASE_URL", "localhost:3000"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_overrides() {
        let mut vars = MINIMAL.to_vec();
        vars.extend([
            ("KEDAI_HOST", "0.0.0.0"),
            ("KEDAI_PORT", "8080"),
            ("KEDAI_UPLOAD_DIR", "/var/lib/kedai/images"),
            ("KEDAI_MAX_UPLOAD_BYTES", "1024"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/kedai/images"));
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.sentry.dsn.as_deref(), Some("https://key@sentry.example/1"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[
            ("KEDAI_DATABASE_URL", "postgres://user:hunter2@db/kedai"),
            ("KEDAI_BASE_URL", "http://localhost"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
