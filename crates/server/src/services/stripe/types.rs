//! Wire types for the Stripe Checkout API.
//!
//! Only the fields this service reads are modelled; everything else in the
//! gateway's responses is ignored by serde.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

/// Payment state of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

/// A checkout session as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page URL; present on freshly created sessions.
    pub url: Option<String>,
    pub payment_status: PaymentStatus,
    /// Subtotal in the smallest currency unit (cents).
    pub amount_subtotal: Option<i64>,
    /// Total in the smallest currency unit (cents).
    pub amount_total: Option<i64>,
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Customer details collected by the hosted checkout page.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<GatewayAddress>,
}

/// Postal address in the gateway's shape.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

/// Input for creating a checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSession {
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: String,
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    /// Flat key/value metadata echoed back on retrieval and in webhooks.
    pub metadata: Vec<(String, String)>,
}

/// One priced line on a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutLineItem {
    /// Display name, e.g. "Diamond Solitaire Ring - Size 7".
    pub name: String,
    pub image_url: Option<String>,
    /// Unit price in the smallest currency unit (cents).
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Convert a gateway amount in cents to a decimal in currency units.
#[must_use]
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert a decimal price in currency units to gateway cents.
///
/// Rounds half-up to the nearest cent. `Decimal::round` uses banker's
/// rounding, which would send a 0.005 midpoint to 0.
#[must_use]
pub fn decimal_to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn test_cents_to_decimal() {
        assert_eq!(cents_to_decimal(499_999), dec("4999.99"));
        assert_eq!(cents_to_decimal(0), dec("0.00"));
    }

    #[test]
    fn test_decimal_to_cents() {
        assert_eq!(decimal_to_cents(dec("4999.99")), 499_999);
        assert_eq!(decimal_to_cents(dec("10")), 1000);
        assert_eq!(decimal_to_cents(dec("0.004")), 0);
    }

    #[test]
    fn test_decimal_to_cents_rounds_midpoints_up() {
        assert_eq!(decimal_to_cents(dec("0.005")), 1);
        assert_eq!(decimal_to_cents(dec("0.015")), 2);
        assert_eq!(decimal_to_cents(dec("19.995")), 2000);
    }

    #[test]
    fn test_session_deserializes_minimal() {
        let json = r#"{
            "id": "cs_test_123",
            "url": null,
            "payment_status": "paid",
            "amount_subtotal": 499999,
            "amount_total": 499999
        }"#;
        let session: CheckoutSession = serde_json::from_str(json).expect("parse");
        assert_eq!(session.id, "cs_test_123");
        assert_eq!(session.payment_status, PaymentStatus::Paid);
        assert!(session.metadata.is_empty());
        assert!(session.customer_details.is_none());
    }

    #[test]
    fn test_session_deserializes_customer_details() {
        let json = r#"{
            "id": "cs_test_456",
            "payment_status": "unpaid",
            "url": "https://checkout.example.com/pay/cs_test_456",
            "amount_subtotal": null,
            "amount_total": null,
            "metadata": {"user_id": "7"},
            "customer_details": {
                "name": "John Doe",
                "email": "customer@example.com",
                "phone": null,
                "address": {
                    "line1": "500 Pine St",
                    "line2": null,
                    "city": "Seattle",
                    "state": "WA",
                    "country": "US",
                    "postal_code": "98101"
                }
            }
        }"#;
        let session: CheckoutSession = serde_json::from_str(json).expect("parse");
        assert_eq!(session.payment_status, PaymentStatus::Unpaid);
        assert_eq!(session.metadata.get("user_id").map(String::as_str), Some("7"));
        let details = session.customer_details.expect("details");
        let address = details.address.expect("address");
        assert_eq!(address.city.as_deref(), Some("Seattle"));
    }
}
