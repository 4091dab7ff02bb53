//! Kedai Core - Shared types and the shopping-cart model.
//!
//! This crate provides the types used across the Kedai components:
//! - `storefront` - Public shop, checkout, and admin JSON API
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. The cart is persisted by whoever owns it (the storefront
//! keeps it in the browser's session record) through [`Cart::to_record`] and
//! [`Cart::from_record`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`cart`] - The per-browser cart: line items, quantity rules, totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{CART_STORAGE_KEY, Cart, CartError, CartLineItem, MAX_LINE_QUANTITY};
pub use types::*;
