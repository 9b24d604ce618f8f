//! Checkout route handler.
//!
//! The cart lives in the client; checkout receives the cart lines, prices
//! them from the database (never trusting client prices), and creates a
//! hosted payment session. The line items are echoed into the session
//! metadata so order creation can rebuild them after payment.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use luxjewels_core::{ProductId, VariantId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::stripe::{CheckoutLineItem, CreateCheckoutSession, decimal_to_cents};
use crate::state::AppState;

/// Checkout request body: the client-side cart.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
}

/// One line of the client-side cart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CartLine {
    pub variant_id: VariantId,
    pub quantity: i32,
}

/// Cart line enriched with the product ID, stored in session metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetadataLine {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: i32,
}

/// Metadata key holding the serialized cart lines.
pub const METADATA_ITEMS_KEY: &str = "items";

/// Metadata key holding the purchasing user's ID.
pub const METADATA_USER_KEY: &str = "user_id";

/// Create a hosted checkout session for the current cart.
pub async fn create_session(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<Value>> {
    if state.config().demo_mode {
        return Err(AppError::DemoMode);
    }

    if body.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_owned()));
    }

    let products = ProductRepository::new(state.pool());

    let mut line_items = Vec::with_capacity(body.items.len());
    let mut metadata_lines = Vec::with_capacity(body.items.len());

    for line in &body.items {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest("Quantity must be positive".to_owned()));
        }

        let variant = products
            .checkout_variant(line.variant_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Unknown product variant {}", line.variant_id))
            })?;

        if variant.stock < line.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {} - {}",
                variant.product_name, variant.variant_name
            )));
        }

        line_items.push(CheckoutLineItem {
            name: format!("{} - {}", variant.product_name, variant.variant_name),
            image_url: variant.image_url,
            unit_amount: decimal_to_cents(variant.price),
            quantity: i64::from(line.quantity),
        });
        metadata_lines.push(MetadataLine {
            product_id: variant.product_id,
            variant_id: variant.variant_id,
            quantity: line.quantity,
        });
    }

    let items_json = serde_json::to_string(&metadata_lines)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let base = &state.config().base_url;
    let input = CreateCheckoutSession {
        success_url: format!("{base}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{base}/checkout"),
        customer_email: user.email.as_str().to_owned(),
        currency: state.config().stripe.currency.clone(),
        line_items,
        metadata: vec![
            (METADATA_USER_KEY.to_owned(), user.id.to_string()),
            (METADATA_ITEMS_KEY.to_owned(), items_json),
        ],
    };

    let session = state.stripe().create_checkout_session(&input).await?;

    Ok(Json(json!({
        "session_id": session.id,
        "url": session.url,
    })))
}
