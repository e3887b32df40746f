//! Order webhook verification and deduplication, end to end through the router.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use headless_shop_core::webhook::{
    HMAC_HEADER, SHOP_DOMAIN_HEADER, TOPIC_HEADER, WEBHOOK_ID_HEADER, compute_signature,
};
use headless_shop_integration_tests::{Secrets, TestApp, WEBHOOK_SECRET};
use serde_json::json;

const ORDER: &str = r#"{"id":820982911946154508,"order_number":1001,"email":"jon@example.com","total_price":"54.00","currency":"USD","line_items":[{"name":"Pineapple Tee - Medium","quantity":2,"price":"27.00"}]}"#;

fn webhook_request(body: &str, signature: Option<&str>, webhook_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/webhooks/orders")
        .header("content-type", "application/json")
        .header(TOPIC_HEADER, "orders/create")
        .header(SHOP_DOMAIN_HEADER, "test-shop.myshopify.com");
    if let Some(signature) = signature {
        builder = builder.header(HMAC_HEADER, signature);
    }
    if let Some(id) = webhook_id {
        builder = builder.header(WEBHOOK_ID_HEADER, id);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn signed(body: &str) -> String {
    compute_signature(body.as_bytes(), WEBHOOK_SECRET)
}

// ============================================================================
// Verification
// ============================================================================

#[tokio::test]
async fn test_valid_signature_is_accepted() {
    let app = TestApp::new();
    let response = app
        .send(webhook_request(ORDER, Some(&signed(ORDER)), Some("delivery-1")))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_tampered_body_is_rejected() {
    let app = TestApp::new();
    let signature = signed(ORDER);
    let tampered = ORDER.replace("54.00", "0.01");

    let response = app
        .send(webhook_request(&tampered, Some(&signature), None))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json(),
        json!({ "error": "Unauthorized: Invalid webhook signature" })
    );
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let app = TestApp::new();
    let response = app.send(webhook_request(ORDER, None, None)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signature_from_other_secret_is_rejected() {
    let app = TestApp::new();
    let forged = compute_signature(ORDER.as_bytes(), "not-the-secret");

    let response = app.send(webhook_request(ORDER, Some(&forged), None)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unconfigured_secret_rejects_everything() {
    let app = TestApp::with_secrets(Secrets {
        webhook: false,
        admin: true,
    });

    let response = app
        .send(webhook_request(ORDER, Some(&signed(ORDER)), None))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "Webhook secret not configured" })
    );
}

#[tokio::test]
async fn test_signed_but_malformed_payload_is_bad_request() {
    let app = TestApp::new();
    let body = "{not json";

    let response = app.send(webhook_request(body, Some(&signed(body)), None)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let error = response.json()["error"].as_str().unwrap().to_owned();
    assert!(error.starts_with("Invalid webhook payload"), "{error}");
}

#[tokio::test]
async fn test_signed_json_of_unexpected_shape_is_accepted() {
    let app = TestApp::new();
    let bodies = [
        r#"{"id":1,"line_items":null}"#,
        r#"{"id":1,"order_number":"1001"}"#,
        r#"{"id":1,"line_items":[{"name":null,"quantity":1,"price":"5.00"}]}"#,
        r#"{"id":1,"customer":null,"total_price":25}"#,
        "[]",
    ];

    for body in bodies {
        let response = app.send(webhook_request(body, Some(&signed(body)), None)).await;
        assert_eq!(response.status, StatusCode::OK, "{body}");
        assert_eq!(response.json(), json!({ "status": "ok" }), "{body}");
    }
}

// ============================================================================
// Deduplication
// ============================================================================

#[tokio::test]
async fn test_redelivery_is_acknowledged() {
    let app = TestApp::new();
    let id = uuid::Uuid::new_v4().to_string();

    for _ in 0..2 {
        let response = app
            .send(webhook_request(ORDER, Some(&signed(ORDER)), Some(&id)))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({ "status": "ok" }));
    }
}

#[tokio::test]
async fn test_minimal_order_is_accepted() {
    let app = TestApp::new();
    let body = r#"{"id":1}"#;

    let response = app.send(webhook_request(body, Some(&signed(body)), None)).await;

    assert_eq!(response.status, StatusCode::OK);
}
