//! Admin back-office route handlers.
//!
//! Every handler takes the `RequireAdmin` extractor; there is no separate
//! admin binary or database, only the role check.

pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch},
};

use crate::state::AppState;

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/products", get(products::index).post(products::create))
        .route("/products/{id}", delete(products::destroy))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", patch(orders::update_status))
        .route("/customers", get(customers::index))
}
