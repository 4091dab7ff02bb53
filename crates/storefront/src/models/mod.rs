//! Domain models for the storefront.
//!
//! Records read from the database are plain typed structs. Records written to
//! it go through validating constructors (`NewProduct::new`, `NewOrder::new`,
//! `UserChanges::new`, ...) so handlers never trust caller-supplied shapes.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

use thiserror::Error;

pub use order::{
    Customer, CustomerInput, NewOrder, NewOrderItem, Order, OrderItem, OrderRequest, OrderUpdate,
    ProductSummary,
};
pub use product::{NewProduct, Product, ProductChanges};
pub use user::{NewUser, User, UserChanges, UserChangesRequest};

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty or absent.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A field was present but unusable.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Trim `value` and reject it if nothing is left.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(trimmed.to_string())
}

/// Trim `value`, mapping blank strings to `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
