//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use luxjewels_core::{OrderId, OrderItemId, OrderNumber, OrderStatus, ProductId, UserId, VariantId};

/// An order header.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    /// Checkout session that paid for this order.
    pub stripe_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item on an order.
///
/// Product and variant names are denormalized into the response so order
/// history renders without extra lookups.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_name: String,
    pub quantity: i32,
    /// Unit price at time of purchase.
    pub price: Decimal,
    /// `price * quantity`.
    pub total: Decimal,
}

/// Shipping address captured from the payment gateway at order creation.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// An order with its items and shipping address, as returned to customers.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
}
