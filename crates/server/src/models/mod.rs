//! Domain models for the LuxJewels API.
//!
//! These types represent validated domain objects separate from database row
//! types; the `db` repositories map rows into them and the route handlers
//! serialize them to JSON.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderItem, OrderWithItems, ShippingAddress};
pub use product::{
    Category, ProductDetail, ProductImage, ProductSummary, ProductVariant, Review,
};
pub use user::{Address, CurrentUser, User};

/// Session keys used by the storefront.
pub mod session_keys {
    /// The logged-in user (`CurrentUser`).
    pub const CURRENT_USER: &str = "current_user";
}
