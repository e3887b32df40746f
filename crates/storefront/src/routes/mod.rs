//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check
//!
//! # Webhooks
//! POST /api/webhooks/orders                 - Verified order notifications
//!
//! # Checkout
//! POST /api/create-checkout                 - Cart lines -> hosted checkout
//! POST /api/validate-and-create-checkout    - Same, after an inventory check
//!
//! # Customer auth (rate limited)
//! POST /api/auth/signup                     - Create customer account
//! POST /api/auth/login                      - Exchange credentials for a token
//!
//! # Admin (requires x-demo-admin-secret)
//! GET  /api/admin/orders                    - Recent orders
//! POST /api/admin/update-inventory          - Set an inventory level
//! POST /api/admin/create-product            - Create a product
//! ```

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/orders", post(webhooks::orders))
}

/// Create the customer auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::orders))
        .route("/update-inventory", post(admin::update_inventory))
        .route("/create-product", post(admin::create_product))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/webhooks", webhook_routes())
        .route("/api/create-checkout", post(checkout::create_checkout))
        .route(
            "/api/validate-and-create-checkout",
            post(checkout::validate_and_create_checkout),
        )
        .nest("/api/auth", auth_routes())
        .nest("/api/admin", admin_routes())
}
