//! Integration tests for the `PUT /api/update-product` relay.
//!
//! The relay holds the Admin token; callers only ever see Shopify's product
//! JSON or one of the relay's own `{"error": ..}` bodies.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::{Value, json};
use shopfront_integration_tests::{ADMIN_TOKEN, FakeShopify, TEE_PRODUCT_ID, TestApp};
use shopfront_storefront::config::ShopifyConfig;

async fn put(app: &TestApp, body: &Value) -> (StatusCode, Value) {
    let resp = app
        .client
        .put(app.url("/api/update-product"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_update_title_and_price() {
    let shopify = FakeShopify::start().await;
    let app = TestApp::spawn(shopify.config()).await;

    let (status, body) = put(
        &app,
        &json!({
            "productId": format!("gid://shopify/Product/{TEE_PRODUCT_ID}"),
            "updatedData": { "title": "New Tee", "price": "19.99" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["title"], "New Tee");
    assert_eq!(body["product"]["variants"][0]["price"], "19.99");

    let updates = shopify.admin_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].product_id, TEE_PRODUCT_ID);
    assert_eq!(
        updates[0].body,
        json!({
            "product": {
                "id": TEE_PRODUCT_ID,
                "title": "New Tee",
                "variants": [{ "price": "19.99" }]
            }
        })
    );
}

#[tokio::test]
async fn test_numeric_id_and_title_only() {
    let shopify = FakeShopify::start().await;
    let app = TestApp::spawn(shopify.config()).await;

    let (status, body) = put(
        &app,
        &json!({ "productId": TEE_PRODUCT_ID, "updatedData": { "title": "Renamed" } }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["title"], "Renamed");
    // Only the title was sent
    assert!(shopify.admin_updates()[0].body["product"].get("variants").is_none());
}

#[tokio::test]
async fn test_response_never_contains_admin_token() {
    let shopify = FakeShopify::start().await;
    shopify.fail_admin_with(500, json!({ "errors": "boom" }));
    let app = TestApp::spawn(shopify.config()).await;

    let resp = app
        .client
        .put(app.url("/api/update-product"))
        .json(&json!({ "productId": "1001", "updatedData": { "title": "x" } }))
        .send()
        .await
        .unwrap();
    let text = resp.text().await.unwrap();
    assert!(!text.contains(ADMIN_TOKEN));
}

// =============================================================================
// Upstream failures
// =============================================================================

#[tokio::test]
async fn test_upstream_status_is_passed_through() {
    let shopify = FakeShopify::start().await;
    shopify.fail_admin_with(422, json!({ "errors": { "title": ["can't be blank"] } }));
    let app = TestApp::spawn(shopify.config()).await;

    let (status, body) = put(
        &app,
        &json!({ "productId": "1001", "updatedData": { "title": "New" } }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Failed to update product");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("can't be blank"));
}

#[tokio::test]
async fn test_unknown_product_is_upstream_404() {
    let shopify = FakeShopify::start().await;
    let app = TestApp::spawn(shopify.config()).await;

    let (status, body) = put(
        &app,
        &json!({ "productId": "424242", "updatedData": { "price": "5" } }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Failed to update product");
}

// =============================================================================
// Invalid input
// =============================================================================

#[tokio::test]
async fn test_invalid_input_is_rejected_before_shopify() {
    let shopify = FakeShopify::start().await;
    let app = TestApp::spawn(shopify.config()).await;

    let cases = [
        (
            json!({ "productId": "", "updatedData": { "title": "x" } }),
            "Product ID is required",
        ),
        (json!({ "productId": "1001", "updatedData": {} }), "Nothing to update"),
        (json!({ "productId": "1001" }), "Nothing to update"),
        (
            json!({ "productId": "1001", "updatedData": { "title": "   " } }),
            "Nothing to update",
        ),
        (json!({ "updatedData": { "title": "x" } }), "Invalid request body"),
    ];

    for (request, expected) in cases {
        let (status, body) = put(&app, &request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{request}");
        assert_eq!(body["error"], expected, "{request}");
    }

    let (status, body) = put(
        &app,
        &json!({ "productId": "1001", "updatedData": { "price": "abc" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid price"));

    assert!(shopify.admin_updates().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let shopify = FakeShopify::start().await;
    let app = TestApp::spawn(shopify.config()).await;

    let resp = app
        .client
        .put(app.url("/api/update-product"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_missing_admin_token_is_internal_error() {
    let shopify = FakeShopify::start().await;
    let config = ShopifyConfig::new(shopify.origin()).with_storefront_token("unused");
    let app = TestApp::spawn(config).await;

    let (status, body) = put(
        &app,
        &json!({ "productId": "1001", "updatedData": { "title": "x" } }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Something went wrong" }));
    assert!(shopify.admin_updates().is_empty());
}
