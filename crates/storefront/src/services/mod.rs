//! Business logic that sits between the route handlers and storage.
//!
//! - `cart_store` - Loads and saves the per-browser [`kedai_core::Cart`]
//!   from the session record
//! - `checkout` - Turns a cart snapshot plus a customer into a stored order
//! - `uploads` - Stores and removes product images on disk

pub mod cart_store;
pub mod checkout;
pub mod uploads;

pub use cart_store::CartStoreError;
pub use checkout::CheckoutError;
pub use uploads::{ImageStore, UploadError};
