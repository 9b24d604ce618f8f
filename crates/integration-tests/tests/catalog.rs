//! Integration tests for the public catalog API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - A seeded catalog (cargo run -p luxjewels-cli -- seed)
//! - The server running (cargo run -p luxjewels-server)

use reqwest::StatusCode;
use serde_json::Value;

use luxjewels_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_health() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/health"))
        .send()
        .await
        .expect("Failed to get health");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_categories_listed_alphabetically() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/api/categories"))
        .send()
        .await
        .expect("Failed to list categories");

    assert_eq!(resp.status(), StatusCode::OK);
    let categories: Vec<Value> = resp.json().await.expect("Failed to parse categories");
    assert!(!categories.is_empty());

    let names: Vec<&str> = categories
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_product_listing_filters_by_category() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/api/products?category=rings"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse products");
    assert!(!products.is_empty());
    for product in &products {
        assert_eq!(product["category"]["slug"].as_str(), Some("rings"));
        assert_eq!(product["status"].as_str(), Some("ACTIVE"));
    }
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_product_listing_sorts_by_price() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/api/products?sort=price&order=asc"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let products: Vec<Value> = resp.json().await.expect("Failed to parse products");

    let prices: Vec<f64> = products
        .iter()
        .filter_map(|p| p["price"].as_str().and_then(|s| s.parse().ok()))
        .collect();
    let mut sorted = prices.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("comparable prices"));
    assert_eq!(prices, sorted);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_product_detail_includes_variants_and_related() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/api/products/diamond-solitaire-ring"))
        .send()
        .await
        .expect("Failed to get product");

    assert_eq!(resp.status(), StatusCode::OK);
    let product: Value = resp.json().await.expect("Failed to parse product");

    assert_eq!(product["slug"].as_str(), Some("diamond-solitaire-ring"));
    assert!(!product["variants"].as_array().expect("variants").is_empty());
    assert!(product["related_products"].is_array());
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_unknown_product_is_404() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/api/products/no-such-product"))
        .send()
        .await
        .expect("Failed to get product");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
