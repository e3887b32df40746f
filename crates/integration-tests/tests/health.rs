//! Liveness and the response headers every route carries.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use headless_shop_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let app = TestApp::new();
    let response = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["cache-control"], "no-store, max-age=0");
}

#[tokio::test]
async fn test_request_id_is_generated_or_propagated() {
    let app = TestApp::new();

    let generated = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert!(generated.headers.contains_key("x-request-id"));

    let propagated = app
        .send(
            Request::get("/health")
                .header("x-request-id", "edge-1234")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(propagated.headers["x-request-id"], "edge-1234");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    let response = app
        .send(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
