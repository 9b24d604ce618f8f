//! Integration tests for the address book API.

use reqwest::StatusCode;
use serde_json::{Value, json};

use luxjewels_integration_tests::TestContext;

fn sample_address() -> Value {
    json!({
        "first_name": "Test",
        "last_name": "Shopper",
        "address_line1": "100 Market St",
        "address_line2": "Apt 4",
        "city": "San Francisco",
        "state": "CA",
        "postal_code": "94105",
        "country": "US",
        "phone": "+1 555 0100",
    })
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_addresses_require_login() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/api/addresses"))
        .send()
        .await
        .expect("Failed to list addresses");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_address_create_list_delete_cycle() {
    let ctx = TestContext::new();
    ctx.register_test_user().await;

    // Fresh account starts with an empty address book
    let resp = ctx
        .client
        .get(ctx.url("/api/addresses"))
        .send()
        .await
        .expect("Failed to list addresses");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse addresses");
    assert_eq!(body["addresses"].as_array().map(Vec::len), Some(0));

    // Save one
    let resp = ctx
        .client
        .post(ctx.url("/api/addresses"))
        .json(&sample_address())
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse address");
    let id = body["address"]["id"].as_i64().expect("address id");
    assert_eq!(body["address"]["city"].as_str(), Some("San Francisco"));

    // It shows up in the listing
    let resp = ctx
        .client
        .get(ctx.url("/api/addresses"))
        .send()
        .await
        .expect("Failed to list addresses");
    let body: Value = resp.json().await.expect("Failed to parse addresses");
    assert_eq!(body["addresses"].as_array().map(Vec::len), Some(1));

    // And can be removed again
    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/addresses/{id}")))
        .send()
        .await
        .expect("Failed to delete address");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/addresses/{id}")))
        .send()
        .await
        .expect("Failed to delete address");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_blank_address_fields_rejected() {
    let ctx = TestContext::new();
    ctx.register_test_user().await;

    let mut body = sample_address();
    body["address_line1"] = json!("   ");

    let resp = ctx
        .client
        .post(ctx.url("/api/addresses"))
        .json(&body)
        .send()
        .await
        .expect("Failed to create address");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_cannot_delete_another_users_address() {
    let owner = TestContext::new();
    owner.register_test_user().await;

    let resp = owner
        .client
        .post(owner.url("/api/addresses"))
        .json(&sample_address())
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse address");
    let id = body["address"]["id"].as_i64().expect("address id");

    let intruder = TestContext::new();
    intruder.register_test_user().await;

    let resp = intruder
        .client
        .delete(intruder.url(&format!("/api/addresses/{id}")))
        .send()
        .await
        .expect("Failed to delete address");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Still there for the owner
    let resp = owner
        .client
        .get(owner.url("/api/addresses"))
        .send()
        .await
        .expect("Failed to list addresses");
    let body: Value = resp.json().await.expect("Failed to parse addresses");
    assert_eq!(body["addresses"].as_array().map(Vec::len), Some(1));
}
