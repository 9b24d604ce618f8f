//! Product repository.
//!
//! Listing queries aggregate the first image, the cheapest variant, and the
//! review statistics in SQL so a catalog page is a single round trip.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use luxjewels_core::{
    CategoryId, ProductId, ProductImageId, ProductStatus, ReviewId, UserId, VariantId,
};

use super::RepositoryError;
use crate::models::product::{
    Category, ProductDetail, ProductImage, ProductSummary, ProductVariant, Review, round_rating,
};

/// Whitelisted sort fields for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    Name,
    Price,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl ProductSort {
    const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "p.created_at",
            Self::Name => "p.name",
            Self::Price => "p.price",
        }
    }
}

impl SortOrder {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Storefront listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to a category by slug.
    pub category_slug: Option<String>,
    /// Restrict to featured (or non-featured) products.
    pub featured: Option<bool>,
    pub sort: ProductSort,
    pub order: SortOrder,
}

/// Input for creating a product with its images and variants.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub status: ProductStatus,
    pub featured: bool,
    pub images: Vec<NewProductImage>,
    pub variants: Vec<NewProductVariant>,
}

/// Input for a product image.
#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub url: String,
    pub alt: Option<String>,
    pub position: i32,
}

/// Input for a product variant.
#[derive(Debug, Clone)]
pub struct NewProductVariant {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub attributes: serde_json::Value,
}

/// Outcome of a product delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteProductOutcome {
    Deleted,
    NotFound,
    /// The product appears on at least one order and must be kept.
    HasOrders,
}

/// Variant data needed to build a checkout line item.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckoutVariant {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub product_name: String,
    pub variant_name: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    sku: String,
    price: Decimal,
    compare_price: Option<Decimal>,
    status: ProductStatus,
    featured: bool,
    created_at: DateTime<Utc>,
    category_id: i32,
    category_name: String,
    category_slug: String,
    category_description: Option<String>,
    image_id: Option<i32>,
    image_url: Option<String>,
    image_alt: Option<String>,
    min_variant_price: Option<Decimal>,
    total_stock: i64,
    review_count: i64,
    avg_rating: Option<f64>,
}

impl From<SummaryRow> for ProductSummary {
    fn from(row: SummaryRow) -> Self {
        let image = match (row.image_id, row.image_url) {
            (Some(id), Some(url)) => Some(ProductImage {
                id: ProductImageId::new(id),
                url,
                alt: row.image_alt,
                position: 0,
            }),
            _ => None,
        };

        Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            sku: row.sku,
            price: row.price,
            compare_price: row.compare_price,
            status: row.status,
            featured: row.featured,
            category: Category {
                id: CategoryId::new(row.category_id),
                name: row.category_name,
                slug: row.category_slug,
                description: row.category_description,
            },
            image,
            min_variant_price: row.min_variant_price,
            total_stock: row.total_stock,
            review_count: row.review_count,
            avg_rating: round_rating(row.avg_rating),
            created_at: row.created_at,
        }
    }
}

/// Shared SELECT list + joins for summary queries.
const SUMMARY_QUERY: &str = r"
    SELECT p.id, p.name, p.slug, p.description, p.sku, p.price, p.compare_price,
           p.status, p.featured, p.created_at,
           c.id   AS category_id,
           c.name AS category_name,
           c.slug AS category_slug,
           c.description AS category_description,
           img.id  AS image_id,
           img.url AS image_url,
           img.alt AS image_alt,
           (SELECT MIN(v.price) FROM product_variants v WHERE v.product_id = p.id)
               AS min_variant_price,
           (SELECT COALESCE(SUM(v.stock), 0) FROM product_variants v WHERE v.product_id = p.id)
               AS total_stock,
           (SELECT COUNT(*) FROM reviews r WHERE r.product_id = p.id)
               AS review_count,
           (SELECT AVG(r.rating)::float8 FROM reviews r WHERE r.product_id = p.id)
               AS avg_rating
    FROM products p
    JOIN categories c ON c.id = p.category_id
    LEFT JOIN LATERAL (
        SELECT i.id, i.url, i.alt
        FROM product_images i
        WHERE i.product_id = p.id
        ORDER BY i.position ASC
        LIMIT 1
    ) img ON TRUE
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products for the storefront.
    ///
    /// The sort field and direction come from whitelisted enums, never from
    /// raw request input.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!(
            r"{SUMMARY_QUERY}
            WHERE p.status = 'ACTIVE'
              AND ($1::TEXT IS NULL OR c.slug = $1)
              AND ($2::BOOLEAN IS NULL OR p.featured = $2)
            ORDER BY {} {}",
            filter.sort.column(),
            filter.order.keyword(),
        );

        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(filter.category_slug.as_deref())
            .bind(filter.featured)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    /// List every product regardless of status, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_admin(&self) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!("{SUMMARY_QUERY} ORDER BY p.created_at DESC");

        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    /// Get a full product detail page by slug.
    ///
    /// Returns `None` if no product has this slug. Inactive products are
    /// still returned; visibility is the route layer's decision.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, RepositoryError> {
        let sql = format!("{SUMMARY_QUERY} WHERE p.slug = $1");
        let Some(row) = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let summary = ProductSummary::from(row);

        let images = self.images_for(summary.id).await?;
        let variants = self.variants_for(summary.id).await?;
        let reviews = self.reviews_for(summary.id).await?;
        let related = self.related_to(summary.id, summary.category.id).await?;

        Ok(Some(ProductDetail {
            id: summary.id,
            name: summary.name,
            slug: summary.slug,
            description: summary.description,
            sku: summary.sku,
            price: summary.price,
            compare_price: summary.compare_price,
            status: summary.status,
            featured: summary.featured,
            category: summary.category,
            images,
            variants,
            reviews,
            review_count: summary.review_count,
            avg_rating: summary.avg_rating,
            related_products: related,
            created_at: summary.created_at,
        }))
    }

    async fn images_for(&self, id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            url: String,
            alt: Option<String>,
            position: i32,
        }

        let rows = sqlx::query_as::<_, Row>(
            r"
            SELECT id, url, alt, position
            FROM product_images
            WHERE product_id = $1
            ORDER BY position ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductImage {
                id: ProductImageId::new(r.id),
                url: r.url,
                alt: r.alt,
                position: r.position,
            })
            .collect())
    }

    async fn variants_for(&self, id: ProductId) -> Result<Vec<ProductVariant>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            sku: String,
            name: String,
            price: Decimal,
            stock: i32,
            attributes: serde_json::Value,
        }

        let rows = sqlx::query_as::<_, Row>(
            r"
            SELECT id, sku, name, price, stock, attributes
            FROM product_variants
            WHERE product_id = $1
            ORDER BY price ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductVariant {
                id: VariantId::new(r.id),
                sku: r.sku,
                name: r.name,
                price: r.price,
                stock: r.stock,
                attributes: r.attributes,
            })
            .collect())
    }

    async fn reviews_for(&self, id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            user_id: i32,
            first_name: Option<String>,
            last_name: Option<String>,
            rating: i32,
            title: Option<String>,
            comment: Option<String>,
            created_at: DateTime<Utc>,
        }

        let rows = sqlx::query_as::<_, Row>(
            r"
            SELECT r.id, r.user_id, u.first_name, u.last_name,
                   r.rating, r.title, r.comment, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let reviewer_name = [r.first_name.as_deref(), r.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                Review {
                    id: ReviewId::new(r.id),
                    user_id: UserId::new(r.user_id),
                    reviewer_name,
                    rating: r.rating,
                    title: r.title,
                    comment: r.comment,
                    created_at: r.created_at,
                }
            })
            .collect())
    }

    /// Up to 4 other active products from the same category.
    async fn related_to(
        &self,
        id: ProductId,
        category_id: CategoryId,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!(
            r"{SUMMARY_QUERY}
            WHERE p.status = 'ACTIVE' AND p.category_id = $1 AND p.id <> $2
            ORDER BY p.created_at DESC
            LIMIT 4"
        );

        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(category_id)
            .bind(id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(ProductSummary::from).collect())
    }

    /// Create a product with its images and variants in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product slug, product SKU,
    /// or any variant SKU already exists.
    pub async fn create(&self, new: &NewProduct) -> Result<ProductId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (product_id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO products
                (category_id, name, slug, description, sku, price, compare_price, status, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(new.category_id)
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(&new.sku)
        .bind(new.price)
        .bind(new.compare_price)
        .bind(new.status)
        .bind(new.featured)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product SKU or slug"))?;

        for image in &new.images {
            sqlx::query(
                "INSERT INTO product_images (product_id, url, alt, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(product_id)
            .bind(&image.url)
            .bind(image.alt.as_deref())
            .bind(image.position)
            .execute(&mut *tx)
            .await?;
        }

        for variant in &new.variants {
            sqlx::query(
                r"
                INSERT INTO product_variants (product_id, sku, name, price, stock, attributes)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(product_id)
            .bind(&variant.sku)
            .bind(&variant.name)
            .bind(variant.price)
            .bind(variant.stock)
            .bind(&variant.attributes)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "variant SKU"))?;
        }

        tx.commit().await?;

        Ok(ProductId::new(product_id))
    }

    /// Delete a product unless it appears on an order.
    ///
    /// Images, variants, and reviews cascade in the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn delete(&self, id: ProductId) -> Result<DeleteProductOutcome, RepositoryError> {
        let (ordered,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM order_items WHERE product_id = $1")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        if ordered > 0 {
            return Ok(DeleteProductOutcome::HasOrders);
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            Ok(DeleteProductOutcome::NotFound)
        } else {
            Ok(DeleteProductOutcome::Deleted)
        }
    }

    /// Fetch the data needed to price a checkout line for a variant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn checkout_variant(
        &self,
        variant_id: VariantId,
    ) -> Result<Option<CheckoutVariant>, RepositoryError> {
        let row = sqlx::query_as::<_, CheckoutVariant>(
            r"
            SELECT v.id AS variant_id, p.id AS product_id,
                   p.name AS product_name, v.name AS variant_name,
                   v.price, v.stock,
                   (SELECT i.url FROM product_images i
                    WHERE i.product_id = p.id
                    ORDER BY i.position ASC LIMIT 1) AS image_url
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            WHERE v.id = $1
            ",
        )
        .bind(variant_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_columns_are_whitelisted() {
        assert_eq!(ProductSort::CreatedAt.column(), "p.created_at");
        assert_eq!(ProductSort::Name.column(), "p.name");
        assert_eq!(ProductSort::Price.column(), "p.price");
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
        assert_eq!(SortOrder::Desc.keyword(), "DESC");
    }

    #[test]
    fn test_sort_deserializes_both_spellings() {
        let s: ProductSort = serde_json::from_str("\"createdAt\"").expect("alias");
        assert_eq!(s, ProductSort::CreatedAt);
        let s: ProductSort = serde_json::from_str("\"created_at\"").expect("snake");
        assert_eq!(s, ProductSort::CreatedAt);
        let s: ProductSort = serde_json::from_str("\"price\"").expect("price");
        assert_eq!(s, ProductSort::Price);
    }

    #[test]
    fn test_defaults_newest_first() {
        let filter = ProductFilter::default();
        assert_eq!(filter.sort, ProductSort::CreatedAt);
        assert_eq!(filter.order, SortOrder::Desc);
    }
}
