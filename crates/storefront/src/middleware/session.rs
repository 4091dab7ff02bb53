//! Session middleware configuration.
//!
//! The session record is the durable per-browser store: it holds the cart
//! across page reloads. Production uses the `PostgreSQL` store from
//! `tower-sessions-sqlx-store`; tests pass an in-memory store.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "kedai_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// # Arguments
///
/// * `store` - Session backend (`PostgresStore` in production)
/// * `config` - Storefront configuration (for the cookie `Secure` flag)
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
