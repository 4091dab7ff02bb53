//! Order repository for database operations.
//!
//! Orders are stored across two tables: `kedai.orders` holds the header with
//! the customer record inlined, `kedai.order_items` holds the lines. Reads
//! join each line to its catalog product so the admin dashboard can show
//! current product data next to the snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kedai_core::{Email, OrderId, OrderStatus, PaymentStatus, Price, ProductId};

use super::RepositoryError;
use crate::models::{Customer, NewOrder, Order, OrderItem, OrderUpdate, ProductSummary};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    customer_name: String,
    customer_email: Email,
    customer_phone: String,
    customer_address: String,
    total_amount: Price,
    status: OrderStatus,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            customer: Customer {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
                address: self.customer_address,
            },
            items,
            total_amount: self.total_amount,
            status: self.status,
            payment_status: self.payment_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: OrderId,
    product_id: Option<ProductId>,
    name: String,
    price: Price,
    quantity: i32,
    product_name: Option<String>,
    product_price: Option<Price>,
    product_image_url: Option<String>,
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        let product = match (row.product_id, row.product_name, row.product_price) {
            (Some(id), Some(name), Some(price)) => Some(ProductSummary {
                id,
                name,
                price,
                image_url: row.product_image_url,
            }),
            _ => None,
        };

        Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            product,
        }
    }
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders with their lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email, customer_phone,
                   customer_address, total_amount, status, payment_status,
                   created_at, updated_at
            FROM kedai.orders
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<OrderId> = rows.iter().map(|row| row.id).collect();
        let mut items = self.items_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect())
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email, customer_phone,
                   customer_address, total_amount, status, payment_status,
                   created_at, updated_at
            FROM kedai.orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let lines = self.items_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(row.into_order(lines)))
    }

    /// Insert an order and its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customer = order.customer();
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO kedai.orders
                (order_number, customer_name, customer_email, customer_phone,
                 customer_address, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_number, customer_name, customer_email, customer_phone,
                      customer_address, total_amount, status, payment_status,
                      created_at, updated_at
            ",
        )
        .bind(order.order_number())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(order.total_amount())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "order number already exists"))?;

        for (position, item) in order.items().iter().enumerate() {
            let quantity = i32::try_from(item.quantity()).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "quantity {} does not fit in a row",
                    item.quantity()
                ))
            })?;
            let position = i32::try_from(position).unwrap_or(i32::MAX);

            // Unknown product ids keep their snapshot with a NULL reference.
            sqlx::query(
                r"
                INSERT INTO kedai.order_items
                    (order_id, position, product_id, name, price, quantity)
                VALUES ($1, $2, (SELECT id FROM kedai.products WHERE id = $3), $4, $5, $6)
                ",
            )
            .bind(row.id)
            .bind(position)
            .bind(item.product_id())
            .bind(item.name())
            .bind(item.price())
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let id = row.id;
        let lines = self.items_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(row.into_order(lines))
    }

    /// Apply a status change. Absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: OrderId, update: &OrderUpdate) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE kedai.orders
            SET status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, order_number, customer_name, customer_email, customer_phone,
                      customer_address, total_amount, status, payment_status,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(update.status)
        .bind(update.payment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let lines = self.items_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(row.into_order(lines))
    }

    /// Number of orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kedai.orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }

    /// Sum of `total_amount` over paid orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn paid_revenue(&self) -> Result<Price, RepositoryError> {
        let revenue: (Price,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM kedai.orders
            WHERE payment_status = $1
            ",
        )
        .bind(PaymentStatus::Paid)
        .fetch_one(self.pool)
        .await?;
        Ok(revenue.0)
    }

    /// Load the lines of `ids`, grouped by order, in line order.
    async fn items_for(
        &self,
        ids: &[OrderId],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(OrderId::as_i32).collect();
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.order_id, i.product_id, i.name, i.price, i.quantity,
                   p.name AS product_name, p.price AS product_price,
                   p.image_url AS product_image_url
            FROM kedai.order_items i
            LEFT JOIN kedai.products p ON p.id = i.product_id
            WHERE i.order_id = ANY($1)
            ORDER BY i.order_id, i.position
            ",
        )
        .bind(raw_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}
