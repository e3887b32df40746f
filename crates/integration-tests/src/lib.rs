//! Integration test harness for Headless Shop.
//!
//! Tests drive the storefront router in-process with
//! [`tower::ServiceExt::oneshot`], so no socket is bound and no Shopify store
//! is needed. The Storefront client points at an unroutable endpoint: any test
//! that reaches Shopify fails fast instead of touching a real shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p headless-shop-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use headless_shop_storefront::config::{ShopifyConfig, StorefrontConfig};
use headless_shop_storefront::shopify::StorefrontClient;
use headless_shop_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

/// Webhook secret used by [`TestApp::new`].
pub const WEBHOOK_SECRET: &str = "whsec-integration-Q7v2k9Lm";
/// Admin route secret used by [`TestApp::new`].
pub const ADMIN_SECRET: &str = "admin-integration-X4p8rT2w";

/// Endpoint nothing listens on.
const UNROUTABLE_ENDPOINT: &str = "http://127.0.0.1:9/api/2024-10/graphql.json";

/// Largest response body the harness will buffer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Which secrets the app under test is configured with.
#[derive(Debug, Clone, Copy)]
pub struct Secrets {
    /// Configure `WEBHOOK_SECRET`.
    pub webhook: bool,
    /// Configure `DEMO_ADMIN_SECRET`.
    pub admin: bool,
}

/// Configuration with test secrets and no Admin API token.
#[must_use]
pub fn test_config(secrets: Secrets) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        shopify: ShopifyConfig {
            store: "test-shop.myshopify.com".to_string(),
            api_version: "2024-10".to_string(),
            storefront_token: SecretString::from("storefront-test-token"),
            admin_api_token: None,
        },
        webhook_secret: secrets
            .webhook
            .then(|| SecretString::from(WEBHOOK_SECRET)),
        webhook_dedup_ttl: Duration::from_secs(60),
        admin_secret: secrets.admin.then(|| SecretString::from(ADMIN_SECRET)),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Response captured by [`TestApp::send`].
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON, or `Value::Null` if it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The storefront router wired to test configuration.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// App with both secrets configured.
    #[must_use]
    pub fn new() -> Self {
        Self::with_secrets(Secrets {
            webhook: true,
            admin: true,
        })
    }

    /// App with a chosen set of secrets.
    #[must_use]
    pub fn with_secrets(secrets: Secrets) -> Self {
        let storefront = StorefrontClient::with_endpoint(UNROUTABLE_ENDPOINT, "storefront-test-token");
        let state = AppState::with_clients(test_config(secrets), storefront, None);
        Self {
            router: headless_shop_storefront::app(state),
        }
    }

    /// Send a request through a clone of the router.
    ///
    /// An unreadable body is returned as empty.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .map(|b| b.to_vec())
            .unwrap_or_default();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
