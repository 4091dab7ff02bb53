//! Session-related keys.
//!
//! The session record is the browser's durable storage: it survives page
//! reloads and is bound to the session cookie.

/// Session keys.
pub mod keys {
    /// Key for the serialized cart. Shared with [`kedai_core::CART_STORAGE_KEY`].
    pub const CART: &str = kedai_core::CART_STORAGE_KEY;
}
