//! Admin product management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use luxjewels_core::{CategoryId, ProductId, ProductStatus};

use crate::db::ProductRepository;
use crate::db::products::{DeleteProductOutcome, NewProduct, NewProductImage, NewProductVariant};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::ProductSummary;
use crate::state::AppState;

/// Product creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<ImageInput>,
    pub variants: Vec<VariantInput>,
}

#[derive(Debug, Deserialize)]
pub struct ImageInput {
    pub url: String,
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VariantInput {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default = "empty_attributes")]
    pub attributes: serde_json::Value,
}

fn empty_attributes() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// List every product regardless of status.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<ProductSummary>>> {
    let products = ProductRepository::new(state.pool()).list_admin().await?;
    Ok(Json(products))
}

/// Create a product with its images and variants.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_owned()));
    }
    if body.variants.is_empty() {
        return Err(AppError::BadRequest(
            "At least one variant is required".to_owned(),
        ));
    }
    if body.price < Decimal::ZERO || body.variants.iter().any(|v| v.price < Decimal::ZERO) {
        return Err(AppError::BadRequest("Prices must not be negative".to_owned()));
    }

    let new = NewProduct {
        category_id: body.category_id,
        name: body.name,
        slug: body.slug,
        description: body.description,
        sku: body.sku,
        price: body.price,
        compare_price: body.compare_price,
        status: body.status,
        featured: body.featured,
        images: body
            .images
            .into_iter()
            .enumerate()
            .map(|(i, img)| NewProductImage {
                url: img.url,
                alt: img.alt,
                position: i32::try_from(i).unwrap_or(i32::MAX),
            })
            .collect(),
        variants: body
            .variants
            .into_iter()
            .map(|v| NewProductVariant {
                sku: v.sku,
                name: v.name,
                price: v.price,
                stock: v.stock,
                attributes: v.attributes,
            })
            .collect(),
    };

    let id = ProductRepository::new(state.pool()).create(&new).await?;

    Ok((StatusCode::CREATED, Json(json!({"id": id}))))
}

/// Delete a product, unless it appears on an order.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    match ProductRepository::new(state.pool()).delete(id).await? {
        DeleteProductOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteProductOutcome::NotFound => Err(AppError::NotFound("Product".to_owned())),
        DeleteProductOutcome::HasOrders => Err(AppError::Database(RepositoryError::Conflict(
            "Product has orders and cannot be deleted".to_owned(),
        ))),
    }
}
