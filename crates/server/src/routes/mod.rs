//! HTTP route handlers for the JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (database ping)
//!
//! # Catalog (public)
//! GET  /api/categories             - Category listing
//! GET  /api/products               - Product listing (?category=&featured=&sort=&order=)
//! GET  /api/products/{slug}        - Product detail with variants, reviews, related
//!
//! # Auth
//! POST /api/auth/register          - Create account
//! POST /api/auth/login             - Login
//! POST /api/auth/logout            - Logout
//! GET  /api/auth/me                - Current user
//!
//! # Address book (requires auth)
//! GET    /api/addresses            - Saved addresses for the current user
//! POST   /api/addresses            - Save an address
//! DELETE /api/addresses/{id}       - Remove a saved address
//!
//! # Checkout & orders (requires auth)
//! POST /api/checkout               - Create a hosted checkout session
//! POST /api/orders                 - Create order from a paid session
//! GET  /api/orders                 - Order history for the current user
//!
//! # Webhooks
//! POST /api/webhooks/stripe        - Payment gateway event receiver
//!
//! # Admin (requires admin role)
//! GET    /api/admin/dashboard      - Store statistics
//! GET    /api/admin/products       - All products including drafts
//! POST   /api/admin/products       - Create product with images and variants
//! DELETE /api/admin/products/{id}  - Delete product (refused if ordered)
//! GET    /api/admin/orders         - All orders
//! PATCH  /api/admin/orders/{id}    - Update order status
//! GET    /api/admin/customers      - Customer list with order stats
//! ```

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod webhooks;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/products", get(catalog::index))
        .route("/products/{slug}", get(catalog::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the address book routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/addresses", get(addresses::index).post(addresses::create))
        .route("/addresses/{id}", delete(addresses::destroy))
}

/// Create the checkout and order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::create_session))
        .route("/orders", post(orders::create).get(orders::index))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(catalog_routes())
                .nest("/auth", auth_routes())
                .merge(address_routes())
                .merge(order_routes())
                .route("/webhooks/stripe", post(webhooks::stripe))
                .nest("/admin", admin::routes()),
        )
}
