//! Checkout handoff: turns client cart lines into a hosted Shopify checkout.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use headless_shop_core::cart::CheckoutLine;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::shopify::{Checkout, VariantAvailability};
use crate::state::AppState;

/// Body of both checkout endpoints.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Lines to check out.
    #[serde(default)]
    pub lines: Option<Vec<CheckoutLine>>,
}

impl CheckoutRequest {
    /// The lines, if present, non-empty, and all with a positive quantity.
    fn into_lines(self) -> std::result::Result<Vec<CheckoutLine>, AppError> {
        let lines = self
            .lines
            .filter(|lines| !lines.is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("Invalid request: lines array required".to_string())
            })?;

        if let Some(line) = lines.iter().find(|line| line.quantity == 0) {
            return Err(AppError::BadRequest(format!(
                "Invalid request: quantity for {} must be at least 1",
                line.variant_id
            )));
        }

        Ok(lines)
    }
}

/// Create a checkout from cart lines.
#[instrument(skip_all)]
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<Checkout>> {
    let Json(request) = payload?;
    let lines = request.into_lines()?;

    let checkout = state.storefront().create_checkout(&lines).await?;
    tracing::info!(checkout_id = %checkout.checkout_id, lines = lines.len(), "Checkout created");

    Ok(Json(checkout))
}

/// Check inventory, then create a checkout.
///
/// If the inventory lookup itself fails, the checkout is still attempted and
/// Shopify enforces availability there.
#[instrument(skip_all)]
pub async fn validate_and_create_checkout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> std::result::Result<Json<serde_json::Value>, CheckoutRejection> {
    let Json(request) = payload.map_err(AppError::from)?;
    let lines = request.into_lines()?;

    let ids: Vec<_> = lines.iter().map(|line| line.variant_id.clone()).collect();
    match state.storefront().variant_availability(&ids).await {
        Ok(variants) => check_availability(&lines, &variants)?,
        Err(e) => {
            tracing::warn!(error = %e, "Inventory validation failed, continuing to checkout");
        }
    }

    let checkout = state
        .storefront()
        .create_checkout(&lines)
        .await
        .map_err(AppError::from)?;
    tracing::info!(checkout_id = %checkout.checkout_id, lines = lines.len(), "Checkout created");

    Ok(Json(json!({
        "ok": true,
        "checkoutUrl": checkout.checkout_url,
        "checkoutId": checkout.checkout_id,
    })))
}

/// Why a validated checkout was refused.
#[derive(Debug)]
pub enum CheckoutRejection {
    /// A line cannot be fulfilled.
    Unavailable {
        /// Message for the shopper.
        message: String,
        /// Units in stock, when stock is what limits the line.
        available: Option<i64>,
    },
    /// Any other failure.
    App(AppError),
}

impl From<AppError> for CheckoutRejection {
    fn from(e: AppError) -> Self {
        Self::App(e)
    }
}

impl IntoResponse for CheckoutRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unavailable { message, available } => {
                tracing::info!(reason = %message, "Checkout refused");
                let mut body = json!({ "ok": false, "error": message });
                if let Some(available) = available {
                    body["available"] = json!(available);
                }
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::App(e) => {
                e.report();
                (
                    e.status(),
                    Json(json!({ "ok": false, "error": e.client_message() })),
                )
                    .into_response()
            }
        }
    }
}

/// Match lines against availability, position by position.
fn check_availability(
    lines: &[CheckoutLine],
    variants: &[Option<VariantAvailability>],
) -> std::result::Result<(), CheckoutRejection> {
    for (idx, line) in lines.iter().enumerate() {
        let Some(variant) = variants.get(idx).and_then(Option::as_ref) else {
            return Err(CheckoutRejection::Unavailable {
                message: "Product variant not found".to_string(),
                available: None,
            });
        };

        if !variant.available_for_sale {
            return Err(CheckoutRejection::Unavailable {
                message: format!("{} is not available for sale", variant.display_name()),
                available: None,
            });
        }

        if !variant.can_fulfil(line.quantity) {
            let available = variant.quantity_available.unwrap_or(0);
            return Err(CheckoutRejection::Unavailable {
                message: format!("Only {available} available for {}", variant.display_name()),
                available: Some(available),
            });
        }
    }

    Ok(())
}
