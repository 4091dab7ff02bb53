//! Order submission from the session cart.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;

use kedai_core::Cart;

use super::cart_store::{self, CartStoreError};
use crate::db::{OrderRepository, RepositoryError};
use crate::models::{Customer, NewOrder, NewOrderItem, Order, ValidationError};

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to store order: {0}")]
    Repository(#[from] RepositoryError),

    /// The order was stored but the cart could not be cleared.
    #[error("failed to clear cart: {0}")]
    CartStore(#[from] CartStoreError),
}

/// Build an order from a snapshot of `cart`.
///
/// Lines carry the name and price captured when each product was added.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] if the cart has no lines.
pub fn order_from_cart(cart: &Cart, customer: Customer) -> Result<NewOrder, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let items = cart.items().iter().map(NewOrderItem::from).collect();
    Ok(NewOrder::new(customer, items)?)
}

/// Place an order for the session's cart and clear the cart.
///
/// The cart is only cleared once the order is stored, so a failed insert
/// leaves it intact for another attempt.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] before touching the database if the
/// cart is empty, or the storage error that stopped the order.
pub async fn place_order(
    pool: &PgPool,
    session: &Session,
    customer: Customer,
) -> Result<Order, CheckoutError> {
    let mut cart = cart_store::load(session).await;
    let new_order = order_from_cart(&cart, customer)?;

    let order = OrderRepository::new(pool).create(&new_order).await?;
    tracing::info!(
        order_number = %order.order_number,
        total = %order.total_amount,
        lines = order.items.len(),
        "order placed"
    );

    cart.clear();
    cart_store::save(session, &cart).await?;

    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kedai_core::{Price, ProductId};

    use super::*;

    fn customer() -> Customer {
        Customer::new("Rina", "rina@example.com", "", "Surabaya").unwrap()
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert!(matches!(
            order_from_cart(&Cart::new(), customer()),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_order_snapshot_matches_cart() {
        let mut cart = Cart::new();
        cart.add_item(ProductId::new(1), "Kopi", Price::from_whole(10_000), None);
        cart.add_item(ProductId::new(1), "Kopi", Price::from_whole(10_000), None);
        cart.add_item(ProductId::new(2), "Gula", Price::from_whole(5_000), None);

        let order = order_from_cart(&cart, customer()).unwrap();

        assert_eq!(order.total_amount(), Price::from_whole(25_000));
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.items()[0].name(), "Kopi");
        assert_eq!(order.items()[0].quantity(), 2);
        assert_eq!(order.items()[1].product_id(), ProductId::new(2));
    }
}
