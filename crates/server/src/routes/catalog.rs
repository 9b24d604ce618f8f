//! Public catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use luxjewels_core::ProductStatus;

use crate::db::{CategoryRepository, ProductRepository};
use crate::db::products::{ProductFilter, ProductSort, SortOrder};
use crate::error::{AppError, Result};
use crate::models::product::{Category, ProductDetail, ProductSummary};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Category slug filter.
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub sort: ProductSort,
    pub order: SortOrder,
}

/// List all categories.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// List active products, filtered and sorted.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let filter = ProductFilter {
        category_slug: query.category,
        featured: query.featured,
        sort: query.sort,
        order: query.order,
    };

    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// Product detail by slug.
///
/// Draft and archived products are hidden from the storefront; they return
/// the same 404 as a slug that never existed.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|p| p.status == ProductStatus::Active)
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    Ok(Json(product))
}
