//! Session-backed cart persistence.
//!
//! The cart lives in the browser's session record under
//! [`keys::CART`](crate::models::session::keys::CART). Handlers load it at the
//! start of a request, mutate it, and save it back before rendering.

use thiserror::Error;
use tower_sessions::Session;

use kedai_core::{Cart, CartError};

use crate::models::session::keys;

/// Errors that can occur while saving a cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("cart encoding failed: {0}")]
    Encode(#[from] CartError),

    #[error("session write failed: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Load the cart for this session.
///
/// Never fails: a missing record is an empty cart, and an unreadable one is
/// logged and treated as empty.
pub async fn load(session: &Session) -> Cart {
    match session.get::<String>(keys::CART).await {
        Ok(record) => Cart::from_record(record.as_deref()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read cart from session");
            Cart::new()
        }
    }
}

/// Overwrite the session's cart record.
///
/// # Errors
///
/// Returns `CartStoreError` if the cart cannot be encoded or the session
/// cannot be written.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), CartStoreError> {
    let record = cart.to_record()?;
    session.insert(keys::CART, record).await?;
    Ok(())
}
