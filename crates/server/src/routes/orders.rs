//! Order route handlers.
//!
//! Orders are created from a paid checkout session on the success redirect.
//! Creation is idempotent per session: the success page can be reloaded and
//! the webhook can race it without producing duplicates.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::OrderRepository;
use crate::db::orders::{NewOrder, NewOrderItem, NewShippingAddress};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::order::OrderWithItems;
use crate::routes::checkout::{METADATA_ITEMS_KEY, METADATA_USER_KEY, MetadataLine};
use crate::services::stripe::{CheckoutSession, PaymentStatus, cents_to_decimal};
use crate::state::AppState;

/// Order creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub session_id: String,
}

/// Create an order from a paid checkout session.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if state.config().demo_mode {
        return Err(AppError::DemoMode);
    }

    let orders = OrderRepository::new(state.pool());

    // Success page reloads hit this path again with the same session.
    if let Some(existing) = orders.find_by_session(&body.session_id).await? {
        return Ok((StatusCode::OK, Json(json!({"order": existing}))));
    }

    let session = state
        .stripe()
        .retrieve_checkout_session(&body.session_id)
        .await?;

    if session.payment_status != PaymentStatus::Paid {
        return Err(AppError::BadRequest("Payment has not completed".to_owned()));
    }

    let session_user = session.metadata.get(METADATA_USER_KEY);
    if session_user.map(String::as_str) != Some(user.id.to_string().as_str()) {
        return Err(AppError::Forbidden(
            "Checkout session belongs to a different user".to_owned(),
        ));
    }

    let items = parse_metadata_items(&session)?;
    if items.is_empty() {
        return Err(AppError::BadRequest("Checkout session has no items".to_owned()));
    }

    let subtotal = session.amount_subtotal.map(cents_to_decimal).unwrap_or_default();
    let total = session.amount_total.map(cents_to_decimal).unwrap_or_default();
    let tax = (total - subtotal).max(Decimal::ZERO);

    let new_order = NewOrder {
        user_id: user.id,
        stripe_session_id: session.id.clone(),
        subtotal,
        tax,
        shipping: Decimal::ZERO,
        total,
        items,
        shipping_address: shipping_address_from(&session),
    };

    let order = orders.create(&new_order).await?;

    tracing::info!(
        order_number = %order.order_number,
        user_id = %user.id,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(json!({"order": order}))))
}

/// Order history for the current user, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Value>> {
    let orders: Vec<OrderWithItems> = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(json!({"orders": orders})))
}

/// Rebuild the cart lines from the session metadata written at checkout.
fn parse_metadata_items(session: &CheckoutSession) -> Result<Vec<NewOrderItem>> {
    let raw = session
        .metadata
        .get(METADATA_ITEMS_KEY)
        .ok_or_else(|| AppError::BadRequest("Checkout session has no items".to_owned()))?;

    let lines: Vec<MetadataLine> = serde_json::from_str(raw)
        .map_err(|_| AppError::BadRequest("Malformed checkout session metadata".to_owned()))?;

    Ok(lines
        .into_iter()
        .map(|l| NewOrderItem {
            product_id: l.product_id,
            variant_id: l.variant_id,
            quantity: l.quantity,
        })
        .collect())
}

/// Shipping address from the customer details the hosted page collected.
///
/// Returns `None` when the gateway collected no usable address; the order is
/// still created.
fn shipping_address_from(session: &CheckoutSession) -> Option<NewShippingAddress> {
    let details = session.customer_details.as_ref()?;
    let address = details.address.as_ref()?;
    let street = address.line1.clone()?;

    Some(NewShippingAddress {
        name: details.name.clone().unwrap_or_default(),
        phone: details.phone.clone(),
        street,
        apartment: address.line2.clone(),
        city: address.city.clone().unwrap_or_default(),
        state: address.state.clone().unwrap_or_default(),
        country: address.country.clone().unwrap_or_default(),
        zip_code: address.postal_code.clone().unwrap_or_default(),
    })
}
