//! Order repository.
//!
//! Order creation is a single transaction: the order row, its items (priced
//! from the current variant rows), the stock decrements, and the shipping
//! address either all land or none do. Idempotency across checkout retries
//! is the unique index on `stripe_session_id` plus the caller's existence
//! check.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use luxjewels_core::{OrderId, OrderItemId, OrderNumber, OrderStatus, ProductId, UserId, VariantId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, OrderWithItems, ShippingAddress};

/// Input for creating an order from a paid checkout session.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub stripe_session_id: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: Option<NewShippingAddress>,
}

/// One cart line on a new order. Unit price is read from the variant row
/// inside the creation transaction.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: i32,
}

/// Shipping address captured from the gateway's customer details.
#[derive(Debug, Clone)]
pub struct NewShippingAddress {
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// An order as listed in the admin back office.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_email: String,
    pub item_count: i64,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A top-selling product for the dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub image_url: Option<String>,
    pub units_sold: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    status: OrderStatus,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    stripe_session_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let order_number = OrderNumber::parse(&self.order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number,
            user_id: UserId::new(self.user_id),
            status: self.status,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping: self.shipping,
            total: self.total,
            stripe_session_id: self.stripe_session_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, status, subtotal, tax, shipping, total, \
                             stripe_session_id, created_at, updated_at";

/// Generate a fresh order number: `ORD-<base36 millis>-<4 random chars>`.
#[must_use]
pub fn generate_order_number() -> OrderNumber {
    let millis = Utc::now().timestamp_millis().max(0);
    let timestamp = to_base36(millis);

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();

    OrderNumber::from_parts(&timestamp, &suffix)
}

/// Uppercase base-36 encoding of a non-negative integer.
fn to_base36(mut n: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    if n == 0 {
        return "0".to_owned();
    }

    let mut out = Vec::new();
    while n > 0 {
        let rem = usize::try_from(n % 36).unwrap_or(0);
        out.push(DIGITS.get(rem).copied().unwrap_or(b'0'));
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find an order by its checkout session ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE stripe_session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Create an order from a paid checkout session.
    ///
    /// Each item is priced from its variant row and the variant stock is
    /// decremented, all inside one transaction. The order starts in
    /// `PROCESSING` because payment is already confirmed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a variant no longer exists.
    /// Returns `RepositoryError::Conflict` if an order for this session was
    /// created concurrently (unique index on `stripe_session_id`).
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_number = generate_order_number();

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders
                (order_number, user_id, status, subtotal, tax, shipping, total, stripe_session_id)
            VALUES ($1, $2, 'PROCESSING', $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order_number.as_str())
        .bind(new.user_id)
        .bind(new.subtotal)
        .bind(new.tax)
        .bind(new.shipping)
        .bind(new.total)
        .bind(&new.stripe_session_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "order for checkout session"))?;

        let order = row.into_order()?;

        for item in &new.items {
            let price: Option<(Decimal,)> =
                sqlx::query_as("SELECT price FROM product_variants WHERE id = $1")
                    .bind(item.variant_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some((price,)) = price else {
                return Err(RepositoryError::NotFound(format!(
                    "product variant {}",
                    item.variant_id
                )));
            };

            let quantity = Decimal::from(item.quantity);
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, variant_id, quantity, price, total)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.variant_id)
            .bind(item.quantity)
            .bind(price)
            .bind(price * quantity)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE product_variants SET stock = stock - $2 WHERE id = $1")
                .bind(item.variant_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(addr) = &new.shipping_address {
            sqlx::query(
                r"
                INSERT INTO shipping_addresses
                    (order_id, name, phone, street, apartment, city, state, country, zip_code)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(order.id)
            .bind(&addr.name)
            .bind(addr.phone.as_deref())
            .bind(&addr.street)
            .bind(addr.apartment.as_deref())
            .bind(&addr.city)
            .bind(&addr.state)
            .bind(&addr.country)
            .bind(&addr.zip_code)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// A user's order history, newest first, with items and shipping address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(row.into_order()?);
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let mut items = self.items_for_orders(&ids).await?;
        let mut addresses = self.addresses_for_orders(&ids).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let id = order.id.as_i32();
                OrderWithItems {
                    items: items.remove(&id).unwrap_or_default(),
                    shipping_address: addresses.remove(&id),
                    order,
                }
            })
            .collect())
    }

    async fn items_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderItem>>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            order_id: i32,
            id: i32,
            product_id: i32,
            variant_id: i32,
            product_name: String,
            variant_name: String,
            quantity: i32,
            price: Decimal,
            total: Decimal,
        }

        let rows = sqlx::query_as::<_, Row>(
            r"
            SELECT oi.order_id, oi.id, oi.product_id, oi.variant_id,
                   p.name AS product_name, v.name AS variant_name,
                   oi.quantity, oi.price, oi.total
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            JOIN product_variants v ON v.id = oi.variant_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id ASC
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for r in rows {
            by_order.entry(r.order_id).or_default().push(OrderItem {
                id: OrderItemId::new(r.id),
                product_id: ProductId::new(r.product_id),
                variant_id: VariantId::new(r.variant_id),
                product_name: r.product_name,
                variant_name: r.variant_name,
                quantity: r.quantity,
                price: r.price,
                total: r.total,
            });
        }

        Ok(by_order)
    }

    async fn addresses_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, ShippingAddress>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            order_id: i32,
            name: String,
            phone: Option<String>,
            street: String,
            apartment: Option<String>,
            city: String,
            state: String,
            country: String,
            zip_code: String,
        }

        let rows = sqlx::query_as::<_, Row>(
            r"
            SELECT order_id, name, phone, street, apartment, city, state, country, zip_code
            FROM shipping_addresses
            WHERE order_id = ANY($1)
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.order_id,
                    ShippingAddress {
                        name: r.name,
                        phone: r.phone,
                        street: r.street,
                        apartment: r.apartment,
                        city: r.city,
                        state: r.state,
                        country: r.country,
                        zip_code: r.zip_code,
                    },
                )
            })
            .collect())
    }

    /// Set an order's status by ID. Returns the updated order, or `None` if
    /// no order has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Set the status of the order tied to a checkout session, optionally
    /// only when it currently has `expected` status.
    ///
    /// Returns `true` if an order was updated. Used by the webhook receiver,
    /// where a missing order is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status_by_session(
        &self,
        session_id: &str,
        expected: Option<OrderStatus>,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders SET status = $3, updated_at = NOW()
            WHERE stripe_session_id = $1
              AND ($2::order_status IS NULL OR status = $2)
            ",
        )
        .bind(session_id)
        .bind(expected)
        .bind(status)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All orders with customer email and item count, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        self.admin_summaries(None).await
    }

    /// The most recent orders for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        self.admin_summaries(Some(limit)).await
    }

    async fn admin_summaries(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            order_number: String,
            customer_email: String,
            item_count: i64,
            status: OrderStatus,
            total: Decimal,
            created_at: DateTime<Utc>,
        }

        let mut sql = String::from(
            r"
            SELECT o.id, o.order_number, u.email AS customer_email,
                   (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) AS item_count,
                   o.status, o.total, o.created_at
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            ",
        );
        if limit.is_some() {
            sql.push_str(" LIMIT $1");
        }

        let mut query = sqlx::query_as::<_, Row>(&sql);
        if let Some(limit) = limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(self.pool).await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for r in rows {
            let order_number = OrderNumber::parse(&r.order_number).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
            })?;
            summaries.push(AdminOrderSummary {
                id: OrderId::new(r.id),
                order_number,
                customer_email: r.customer_email,
                item_count: r.item_count,
                status: r.status,
                total: r.total,
                created_at: r.created_at,
            });
        }

        Ok(summaries)
    }

    /// Count all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }

    /// Total revenue across all non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_revenue(&self) -> Result<Decimal, RepositoryError> {
        let sum: (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total), 0) FROM orders WHERE status <> 'CANCELLED'",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(sum.0)
    }

    /// Best-selling products by units sold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(&self, limit: i64) -> Result<Vec<TopProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT oi.product_id, p.name AS product_name,
                   (SELECT i.url FROM product_images i
                    WHERE i.product_id = p.id
                    ORDER BY i.position ASC LIMIT 1) AS image_url,
                   SUM(oi.quantity) AS units_sold
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            GROUP BY oi.product_id, p.id
            ORDER BY units_sold DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_000_000), "LFLS");
    }

    #[test]
    fn test_generate_order_number_is_valid() {
        let n = generate_order_number();
        assert!(OrderNumber::parse(n.as_str()).is_ok());
        assert!(n.as_str().starts_with("ORD-"));
    }

    #[test]
    fn test_generate_order_number_suffix_varies() {
        // Two numbers generated back to back share the millisecond timestamp
        // often enough that uniqueness rests on the random suffix.
        let a = generate_order_number();
        let b = generate_order_number();
        // Not a strict guarantee, but a collision here is a 1-in-1.6M event.
        assert_ne!(a, b);
    }
}
