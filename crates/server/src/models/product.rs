//! Catalog domain types.
//!
//! `ProductSummary` is the listing shape (one image, cheapest variant,
//! aggregate rating); `ProductDetail` is the full page shape with every
//! image, variant, and review.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use luxjewels_core::{
    CategoryId, ProductId, ProductImageId, ProductStatus, ReviewId, UserId, VariantId,
};

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// A product image, ordered by `position` within its product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub url: String,
    pub alt: Option<String>,
    pub position: i32,
}

/// A purchasable variant of a product (e.g. ring size, chain length).
#[derive(Debug, Clone, Serialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    /// Free-form attribute map, e.g. `{"size": "7"}`.
    pub attributes: serde_json::Value,
}

/// A customer review.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    /// Reviewer display name ("First Last"), joined from the users table.
    pub reviewer_name: String,
    /// Rating from 1 to 5.
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listing view of a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub status: ProductStatus,
    pub featured: bool,
    pub category: Category,
    /// First image by position, if any.
    pub image: Option<ProductImage>,
    /// Cheapest variant price, if the product has variants.
    pub min_variant_price: Option<Decimal>,
    /// Total stock across variants.
    pub total_stock: i64,
    pub review_count: i64,
    /// Average rating rounded to one decimal place; 0.0 with no reviews.
    pub avg_rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Full detail view of a product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub status: ProductStatus,
    pub featured: bool,
    pub category: Category,
    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
    pub reviews: Vec<Review>,
    pub review_count: i64,
    pub avg_rating: f64,
    /// Up to 4 active products from the same category.
    pub related_products: Vec<ProductSummary>,
    pub created_at: DateTime<Utc>,
}

/// Round an average rating to one decimal place, 0.0 when absent.
#[must_use]
pub fn round_rating(avg: Option<f64>) -> f64 {
    avg.map_or(0.0, |r| (r * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::round_rating;

    #[test]
    fn test_round_rating_none() {
        assert!((round_rating(None) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_rating_rounds_to_one_decimal() {
        assert!((round_rating(Some(4.666_666)) - 4.7).abs() < f64::EPSILON);
        assert!((round_rating(Some(3.04)) - 3.0).abs() < f64::EPSILON);
    }
}
