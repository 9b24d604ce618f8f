//! Admin dashboard statistics.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::orders::{AdminOrderSummary, TopProduct};
use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// How many recent orders and top products the dashboard shows.
const DASHBOARD_LIMIT: i64 = 5;

/// Store-wide statistics for the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    /// Revenue across all non-cancelled orders.
    pub total_revenue: Decimal,
    pub recent_orders: Vec<AdminOrderSummary>,
    pub top_products: Vec<TopProduct>,
}

/// Assemble the dashboard statistics.
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool);

    let stats = DashboardStats {
        total_products: ProductRepository::new(pool).count().await?,
        total_orders: orders.count().await?,
        total_customers: UserRepository::new(pool).count_customers().await?,
        total_revenue: orders.total_revenue().await?,
        recent_orders: orders.recent(DASHBOARD_LIMIT).await?,
        top_products: orders.top_products(DASHBOARD_LIMIT).await?,
    };

    Ok(Json(stats))
}
