//! Customer signup and login against the Storefront API.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::shopify::{CustomerCreateInput, ShopifyError};
use crate::state::AppState;

/// Login form.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Create a customer account.
///
/// Shopify validation errors (e.g., email taken) return 400 with the first
/// message.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CustomerCreateInput>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(input) = payload?;

    let customer = state.storefront().customer_create(input).await?;
    tracing::info!(customer_id = %customer.id, "Customer account created");

    Ok(Json(json!({ "success": true, "customer": customer })))
}

/// Log a customer in and return their access token.
///
/// Rejected credentials return 401 with Shopify's first message.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;

    let token = state
        .storefront()
        .customer_access_token_create(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            ShopifyError::UserError(message) => AppError::Unauthorized(if message.is_empty() {
                "Invalid credentials".to_string()
            } else {
                message
            }),
            other => AppError::Shopify(other),
        })?;

    let customer = state.storefront().customer(&token.access_token).await?;
    tracing::info!(customer_id = %customer.id, "Customer logged in");

    Ok(Json(json!({
        "accessToken": token.access_token,
        "customer": customer,
    })))
}
