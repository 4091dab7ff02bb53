//! Orders, their lines and the customer record they carry.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use kedai_core::{
    CartLineItem, Email, MAX_LINE_QUANTITY, OrderId, OrderStatus, PaymentStatus, Price, ProductId,
};

use super::{ValidationError, required_text};

const ORDER_SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_SUFFIX_LEN: usize = 6;

/// Who placed an order and where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
}

impl Customer {
    /// Validate a customer record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name or address is blank or the
    /// email is malformed.
    pub fn new(
        name: &str,
        email: &str,
        phone: &str,
        address: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", name)?,
            email: Email::parse(email).map_err(|e| ValidationError::invalid("email", e))?,
            phone: phone.trim().to_string(),
            address: required_text("address", address)?,
        })
    }
}

/// The catalog product an order line points at, when it still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: Option<String>,
}

/// One line of a stored order.
///
/// `name` and `price` are the snapshot taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    pub quantity: i32,
    pub product: Option<ProductSummary>,
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    product_id: ProductId,
    name: String,
    price: Price,
    quantity: u32,
}

impl NewOrderItem {
    /// Validate an order line.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is blank or the quantity is
    /// below one or above [`MAX_LINE_QUANTITY`].
    pub fn new(
        product_id: ProductId,
        name: &str,
        price: Price,
        quantity: i64,
    ) -> Result<Self, ValidationError> {
        let name = required_text("items.name", name)?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| ValidationError::invalid("items.quantity", "must be at least 1"))?;
        if quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::invalid(
                "items.quantity",
                format!("must be at most {MAX_LINE_QUANTITY}"),
            ));
        }

        Ok(Self {
            product_id,
            name,
            price,
            quantity,
        })
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&CartLineItem> for NewOrderItem {
    fn from(line: &CartLineItem) -> Self {
        Self {
            product_id: line.product_id(),
            name: line.name().to_string(),
            price: line.unit_price(),
            quantity: line.quantity(),
        }
    }
}

/// A validated order ready to be written, with its number and total fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    order_number: String,
    customer: Customer,
    items: Vec<NewOrderItem>,
    total_amount: Price,
}

impl NewOrder {
    /// Build an order, computing its total and assigning a fresh number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] if `items` is empty, or an
    /// invalid `total_amount` if the total is too large to store.
    pub fn new(customer: Customer, items: Vec<NewOrderItem>) -> Result<Self, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::Missing("items"));
        }
        let total_amount: Price = items.iter().map(NewOrderItem::line_total).sum();
        if !total_amount.is_storable() {
            return Err(ValidationError::invalid(
                "total_amount",
                format!("must be below {}", Price::MAX_EXCLUSIVE),
            ));
        }

        Ok(Self {
            order_number: generate_order_number(Utc::now()),
            customer,
            items,
            total_amount,
        })
    }

    #[must_use]
    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    #[must_use]
    pub const fn customer(&self) -> &Customer {
        &self.customer
    }

    #[must_use]
    pub fn items(&self) -> &[NewOrderItem] {
        &self.items
    }

    #[must_use]
    pub const fn total_amount(&self) -> Price {
        self.total_amount
    }
}

/// `ORD-YYYYMMDD-XXXXXX` with an uppercase alphanumeric suffix.
fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_SUFFIX_LEN)
        .filter_map(|_| ORDER_SUFFIX_CHARSET.choose(&mut rng).copied())
        .map(char::from)
        .collect();
    format!("ORD-{}-{suffix}", now.format("%Y%m%d"))
}

/// Status changes from the admin dashboard. Absent fields are left as is.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none()
    }
}

// =============================================================================
// Request bodies
// =============================================================================

/// Customer fields as submitted, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl CustomerInput {
    /// # Errors
    ///
    /// See [`Customer::new`].
    pub fn validate(&self) -> Result<Customer, ValidationError> {
        Customer::new(&self.name, &self.email, &self.phone, &self.address)
    }
}

/// An order line as submitted to `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    pub price: Price,
    pub quantity: i64,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub customer: CustomerInput,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

impl OrderRequest {
    /// Validate the request into an order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<NewOrder, ValidationError> {
        let customer = self.customer.validate()?;
        let items = self
            .items
            .iter()
            .map(|item| NewOrderItem::new(item.product_id, &item.name, item.price, item.quantity))
            .collect::<Result<Vec<_>, _>>()?;
        NewOrder::new(customer, items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use kedai_core::Cart;

    use super::*;

    fn customer() -> Customer {
        Customer::new("Siti", "siti@example.com", "0812", "Jl. Merdeka 1").unwrap()
    }

    fn item(id: i32, price: u32, quantity: i64) -> NewOrderItem {
        NewOrderItem::new(ProductId::new(id), "Barang", Price::from_whole(price), quantity).unwrap()
    }

    #[test]
    fn test_customer_validation() {
        assert!(matches!(
            Customer::new("Siti", "not-an-email", "", "Jl. Merdeka 1"),
            Err(ValidationError::Invalid { field: "email", .. })
        ));
        assert_eq!(
            Customer::new("", "siti@example.com", "", "Jl. Merdeka 1"),
            Err(ValidationError::Missing("name"))
        );
        assert_eq!(
            Customer::new("Siti", "siti@example.com", "", "  "),
            Err(ValidationError::Missing("address"))
        );
    }

    #[test]
    fn test_item_quantity_must_be_positive() {
        for quantity in [0, -3, 3_000_000_000, i64::from(MAX_LINE_QUANTITY) + 1, i64::MAX] {
            assert!(matches!(
                NewOrderItem::new(ProductId::new(1), "Kopi", Price::ZERO, quantity),
                Err(ValidationError::Invalid { field: "items.quantity", .. })
            ));
        }
        let top = NewOrderItem::new(
            ProductId::new(1),
            "Kopi",
            Price::ZERO,
            i64::from(MAX_LINE_QUANTITY),
        )
        .unwrap();
        assert_eq!(top.quantity(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_total_must_fit_storage() {
        let price: Price = "999999999999.99".parse().unwrap();
        let single = NewOrderItem::new(ProductId::new(1), "Emas", price, 1).unwrap();
        assert_eq!(
            NewOrder::new(customer(), vec![single.clone()]).unwrap().total_amount(),
            price
        );

        assert!(matches!(
            NewOrder::new(customer(), vec![single.clone(), single]),
            Err(ValidationError::Invalid { field: "total_amount", .. })
        ));
        assert!(matches!(
            NewOrder::new(customer(), vec![item(1, 1_000, i64::from(MAX_LINE_QUANTITY))]),
            Err(ValidationError::Invalid { field: "total_amount", .. })
        ));
    }

    #[test]
    fn test_total_computed_from_items() {
        let order = NewOrder::new(customer(), vec![item(1, 10_000, 2), item(2, 5_000, 1)]).unwrap();
        assert_eq!(order.total_amount(), Price::from_whole(25_000));
        assert_eq!(order.items().len(), 2);
    }

    #[test]
    fn test_order_requires_items() {
        assert_eq!(
            NewOrder::new(customer(), Vec::new()),
            Err(ValidationError::Missing("items"))
        );
    }

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let number = generate_order_number(now);

        assert_eq!(number.len(), "ORD-20240309-XXXXXX".len());
        assert!(number.starts_with("ORD-20240309-"));
        let suffix = number.trim_start_matches("ORD-20240309-");
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_items_from_cart_snapshot() {
        let mut cart = Cart::new();
        cart.add_item(ProductId::new(7), "Teh", Price::from_whole(8_000), None);
        cart.add_item(ProductId::new(7), "Teh", Price::from_whole(8_000), None);

        let items: Vec<NewOrderItem> = cart.items().iter().map(NewOrderItem::from).collect();
        let order = NewOrder::new(customer(), items).unwrap();

        assert_eq!(order.items()[0].quantity(), 2);
        assert_eq!(order.total_amount(), cart.total());
    }

    #[test]
    fn test_request_validation() {
        let request: OrderRequest = serde_json::from_value(serde_json::json!({
            "customer": {"name": "Budi", "email": "budi@example.com", "address": "Bandung"},
            "items": [{"productId": 1, "name": "Kopi", "price": "45000", "quantity": 2}]
        }))
        .unwrap();
        let order = request.validate().unwrap();
        assert_eq!(order.total_amount(), Price::from_whole(90_000));
        assert_eq!(order.customer().phone, "");

        let request: OrderRequest = serde_json::from_value(serde_json::json!({
            "customer": {"name": "Budi", "email": "budi@example.com", "address": "Bandung"},
            "items": []
        }))
        .unwrap();
        assert_eq!(request.validate(), Err(ValidationError::Missing("items")));
    }

    #[test]
    fn test_update_parses_wire_names() {
        let update: OrderUpdate =
            serde_json::from_str(r#"{"status": "shipped", "paymentStatus": "paid"}"#).unwrap();
        assert_eq!(update.status, Some(OrderStatus::Shipped));
        assert_eq!(update.payment_status, Some(PaymentStatus::Paid));
        assert!(OrderUpdate::default().is_empty());
        assert!(serde_json::from_str::<OrderUpdate>(r#"{"status": "lost"}"#).is_err());
    }
}
