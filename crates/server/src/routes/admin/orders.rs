//! Admin order management.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use luxjewels_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::db::orders::AdminOrderSummary;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// List all orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminOrderSummary>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// Set an order's status.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, body.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;

    tracing::info!(
        order_id = %id,
        status = %body.status,
        admin = %admin.email,
        "Order status updated"
    );

    Ok(Json(json!({"order": order})))
}
