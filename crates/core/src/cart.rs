//! The per-browser shopping cart.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s, unique by product id.
//! Each line carries a snapshot of the product's name, price and image taken
//! when it was first added; later catalog edits do not reach carts that already
//! hold the product.
//!
//! # Invariants
//!
//! - No two lines share a `product_id`. Adding a product that is already in
//!   the cart increments its quantity.
//! - Every line has `quantity >= 1`. A change that would bring a line to zero
//!   or below removes the line instead.
//! - No line exceeds [`MAX_LINE_QUANTITY`]; increments past it are clamped.
//! - The total is derived on every read and never stored.
//!
//! # Persistence
//!
//! The cart is stored as a single record (see [`CART_STORAGE_KEY`]) holding a
//! JSON array of `{id, name, price, quantity, imageUrl}`. Restoring never
//! fails: a missing or unreadable record gives an empty cart, and a record that
//! parses but breaks the invariants is repaired on the way in.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Key of the durable per-browser record that holds the cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Largest quantity a line can hold, matching the `INTEGER` order-item column.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Errors produced by cart persistence.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The cart could not be serialized.
    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineItem {
    #[serde(rename = "id")]
    product_id: ProductId,
    name: String,
    #[serde(rename = "price")]
    unit_price: Price,
    quantity: u32,
    #[serde(rename = "imageUrl")]
    image_ref: Option<String>,
}

impl CartLineItem {
    /// The catalog product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Product name at the time it was added.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price at the time it was added.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Number of units, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Product image at the time it was added.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Shape of a line as found in storage, before the invariants are checked.
#[derive(Deserialize)]
struct StoredLine {
    id: ProductId,
    name: String,
    price: Price,
    quantity: i64,
    #[serde(rename = "imageUrl", default)]
    image_url: Option<String>,
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart its quantity goes up by one and
    /// the stored snapshot is kept; otherwise a new line with quantity 1 is
    /// appended. The product id is not checked against the catalog.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Price,
        image_ref: Option<String>,
    ) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
            return;
        }

        self.items.push(CartLineItem {
            product_id,
            name: name.into(),
            unit_price,
            quantity: 1,
            image_ref,
        });
    }

    /// Adjust the quantity of the line at `index` by `delta`.
    ///
    /// The line is removed when the result is zero or less. Returns `false`
    /// and leaves the cart untouched when `index` is out of range.
    pub fn change_quantity(&mut self, index: usize, delta: i32) -> bool {
        let Some(line) = self.items.get_mut(index) else {
            return false;
        };

        let next = i64::from(line.quantity) + i64::from(delta);
        if next <= 0 {
            self.items.remove(index);
        } else {
            line.quantity = clamp_quantity(next);
        }
        true
    }

    /// Remove the line at `index`, returning it.
    ///
    /// Out-of-range indices are a no-op and return `None`.
    pub fn remove_item(&mut self, index: usize) -> Option<CartLineItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `unit_price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of all quantities, for the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Serialize the cart into its storage record.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Serialize`] if JSON encoding fails.
    pub fn to_record(&self) -> Result<String, CartError> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Rebuild a cart from its storage record.
    ///
    /// `None`, an unparseable record, or anything other than an array of lines
    /// yields an empty cart. Lines with a non-positive quantity are dropped
    /// and repeated product ids are merged into the first occurrence.
    #[must_use]
    pub fn from_record(record: Option<&str>) -> Self {
        let Some(raw) = record else {
            return Self::new();
        };

        let stored: Vec<StoredLine> = match serde_json::from_str(raw) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cart record");
                return Self::new();
            }
        };

        let mut cart = Self::new();
        for line in stored {
            if line.quantity <= 0 {
                tracing::debug!(product_id = %line.id, "dropping cart line with no quantity");
                continue;
            }
            let quantity = clamp_quantity(line.quantity);

            if let Some(existing) = cart
                .items
                .iter_mut()
                .find(|existing| existing.product_id == line.id)
            {
                existing.quantity =
                    clamp_quantity(i64::from(existing.quantity) + i64::from(quantity));
                continue;
            }

            cart.items.push(CartLineItem {
                product_id: line.id,
                name: line.name,
                unit_price: line.price,
                quantity,
                image_ref: line.image_url,
            });
        }
        cart
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.clamp(1, i64::from(MAX_LINE_QUANTITY))).unwrap_or(MAX_LINE_QUANTITY)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn shirt() -> (ProductId, &'static str, Price, Option<String>) {
        (
            ProductId::new(1),
            "Shirt",
            Price::from_whole(50_000),
            Some("/uploads/shirt.jpg".to_string()),
        )
    }

    fn add_shirt(cart: &mut Cart) {
        let (id, name, price, image) = shirt();
        cart.add_item(id, name, price, image);
    }

    #[test]
    fn test_distinct_products_get_one_line_each() {
        let mut cart = Cart::new();
        let adds = [3, 1, 3, 2, 3, 1];
        for id in adds {
            cart.add_item(ProductId::new(id), format!("p{id}"), Price::from_whole(1_000), None);
        }

        assert_eq!(cart.len(), 3);
        for line in cart.items() {
            let expected = adds
                .iter()
                .filter(|&&id| id == line.product_id().as_i32())
                .count();
            assert_eq!(line.quantity() as usize, expected);
        }
        // First-add order is kept
        let ids: Vec<i32> = cart.items().iter().map(|l| l.product_id().as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_adding_twice_increments_quantity() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        add_shirt(&mut cart);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity(), 2);
    }

    #[test]
    fn test_snapshot_not_replaced_on_readd() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        cart.add_item(ProductId::new(1), "Renamed", Price::from_whole(1), None);

        let line = &cart.items()[0];
        assert_eq!(line.name(), "Shirt");
        assert_eq!(line.unit_price(), Price::from_whole(50_000));
        assert_eq!(line.quantity(), 2);
    }

    #[test]
    fn test_change_quantity_to_zero_removes_line() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        add_shirt(&mut cart);
        cart.add_item(ProductId::new(2), "Hat", Price::from_whole(20_000), None);

        assert!(cart.change_quantity(0, -2));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].name(), "Hat");
    }

    #[test]
    fn test_change_quantity_below_zero_removes_line() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);

        assert!(cart.change_quantity(0, -5));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_out_of_range_is_noop() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        let before = cart.clone();

        assert!(!cart.change_quantity(1, 1));
        assert!(!cart.change_quantity(usize::MAX, -1));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        cart.add_item(ProductId::new(2), "Hat", Price::from_whole(20_000), None);

        let removed = cart.remove_item(0).unwrap();
        assert_eq!(removed.name(), "Shirt");
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove_item_out_of_range_is_noop() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        let before = cart.clone();

        assert!(cart.remove_item(3).is_none());
        assert_eq!(cart, before);
        assert!(Cart::new().remove_item(0).is_none());
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let mut cart = Cart::new();
        cart.add_item(ProductId::new(1), "A", Price::from_whole(10_000), None);
        cart.add_item(ProductId::new(1), "A", Price::from_whole(10_000), None);
        cart.add_item(ProductId::new(2), "B", Price::from_whole(5_000), None);

        assert_eq!(cart.total(), Price::from_whole(25_000));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_record_round_trip() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        add_shirt(&mut cart);
        cart.add_item(ProductId::new(7), "Hat", "12500.5".parse().unwrap(), None);

        let record = cart.to_record().unwrap();
        let restored = Cart::from_record(Some(&record));
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_record_shape() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);

        let value: serde_json::Value = serde_json::from_str(&cart.to_record().unwrap()).unwrap();
        let line = &value[0];
        assert_eq!(line["id"], 1);
        assert_eq!(line["name"], "Shirt");
        assert_eq!(line["quantity"], 1);
        assert_eq!(line["imageUrl"], "/uploads/shirt.jpg");
        assert!(line.get("price").is_some());
    }

    #[test]
    fn test_restore_missing_or_corrupt_is_empty() {
        assert!(Cart::from_record(None).is_empty());
        assert!(Cart::from_record(Some("")).is_empty());
        assert!(Cart::from_record(Some("{not json")).is_empty());
        assert!(Cart::from_record(Some("{\"id\": 1}")).is_empty());
        assert!(Cart::from_record(Some("[{\"productId\": \"x\"}]")).is_empty());
    }

    #[test]
    fn test_restore_accepts_numeric_prices_and_missing_image() {
        let cart = Cart::from_record(Some(
            r#"[{"id": 4, "name": "Mug", "price": 35000, "quantity": 2}]"#,
        ));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].image_ref(), None);
        assert_eq!(cart.total(), Price::from_whole(70_000));
    }

    #[test]
    fn test_restore_repairs_invariants() {
        let cart = Cart::from_record(Some(
            r#"[
                {"id": 1, "name": "Shirt", "price": 50000, "quantity": 1, "imageUrl": null},
                {"id": 2, "name": "Hat", "price": 20000, "quantity": 0, "imageUrl": null},
                {"id": 1, "name": "Shirt", "price": 50000, "quantity": 2, "imageUrl": null},
                {"id": 3, "name": "Sock", "price": 5000, "quantity": -4, "imageUrl": null}
            ]"#,
        ));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity(), 3);
    }

    #[test]
    fn test_quantity_capped_at_max() {
        let mut cart = Cart::new();
        add_shirt(&mut cart);
        assert!(cart.change_quantity(0, i32::MAX));
        assert_eq!(cart.items()[0].quantity(), MAX_LINE_QUANTITY);

        add_shirt(&mut cart);
        assert!(cart.change_quantity(0, i32::MAX));
        assert_eq!(cart.items()[0].quantity(), MAX_LINE_QUANTITY);

        assert!(cart.change_quantity(0, -1));
        assert_eq!(cart.items()[0].quantity(), MAX_LINE_QUANTITY - 1);

        let restored = Cart::from_record(Some(
            r#"[
                {"id": 1, "name": "Shirt", "price": 50000, "quantity": 4294967295},
                {"id": 2, "name": "Hat", "price": 20000, "quantity": 2147483000},
                {"id": 2, "name": "Hat", "price": 20000, "quantity": 2147483000}
            ]"#,
        ));
        assert_eq!(restored.len(), 2);
        assert!(restored.items().iter().all(|line| line.quantity() == MAX_LINE_QUANTITY));
        assert!(!restored.total().is_storable());
    }

    #[test]
    fn test_restore_rejects_out_of_bounds_price() {
        let cart = Cart::from_record(Some(
            r#"[{"id": 1, "name": "Shirt", "price": "79228162514264337593543950335", "quantity": 2}]"#,
        ));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut cart = Cart::new();

        add_shirt(&mut cart);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total(), Price::from_whole(50_000));

        add_shirt(&mut cart);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Price::from_whole(100_000));

        cart.change_quantity(0, -1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total(), Price::from_whole(50_000));

        cart.change_quantity(0, -1);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }
}
