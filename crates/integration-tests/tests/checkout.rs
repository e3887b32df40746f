//! Checkout request validation.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use headless_shop_integration_tests::TestApp;
use serde_json::json;

fn post(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn test_empty_lines_are_rejected() {
    let app = TestApp::new();

    for body in [r#"{"lines":[]}"#, "{}"] {
        let response = app.send(post("/api/create-checkout", body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json(),
            json!({ "error": "Invalid request: lines array required" })
        );
    }
}

#[tokio::test]
async fn test_zero_quantity_is_rejected() {
    let app = TestApp::new();
    let body = r#"{"lines":[{"variantId":"gid://shopify/ProductVariant/1","quantity":0}]}"#;

    let response = app.send(post("/api/create-checkout", body)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validated_checkout_reports_ok_false() {
    let app = TestApp::new();

    let response = app
        .send(post("/api/validate-and-create-checkout", r#"{"lines":[]}"#))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("Invalid request: lines array required"));
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let app = TestApp::new();
    let request = Request::post("/api/create-checkout")
        .body(Body::from("lines=1"))
        .unwrap();

    let response = app.send(request).await;

    assert!(response.status.is_client_error());
    let error = response.json()["error"].as_str().unwrap().to_owned();
    assert!(error.starts_with("Invalid request"), "{error}");
}

#[tokio::test]
async fn test_unreachable_shopify_is_server_error() {
    let app = TestApp::new();
    let body = r#"{"lines":[{"variantId":"gid://shopify/ProductVariant/1","quantity":1}]}"#;

    let response = app.send(post("/api/create-checkout", body)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json()["error"].is_string());
}
