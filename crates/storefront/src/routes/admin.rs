//! Secret-gated proxy to the Shopify Admin API.
//!
//! Every handler takes [`RequireAdminSecret`] first, so the secret is checked
//! before the body is read.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminSecret;
use crate::shopify::{AdminClient, InventoryLevelUpdate};
use crate::state::AppState;

/// Orders returned by the orders endpoint.
const RECENT_ORDERS_LIMIT: u32 = 50;

fn admin_client(state: &AppState) -> Result<&AdminClient> {
    state
        .admin()
        .ok_or_else(|| AppError::NotConfigured("ADMIN_API_TOKEN".to_string()))
}

/// List recent orders.
#[instrument(skip_all)]
pub async fn orders(_admin: RequireAdminSecret, State(state): State<AppState>) -> Result<Json<Value>> {
    let orders = admin_client(&state)?
        .recent_orders(RECENT_ORDERS_LIMIT)
        .await?;

    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// Inventory update form.
///
/// Fields are kept as raw JSON so that a missing or unusable one is reported
/// with a single message. IDs may be numbers, numeric strings, or GIDs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryRequest {
    /// Admin inventory item ID.
    #[serde(default)]
    pub inventory_item_id: Option<Value>,
    /// Admin location ID.
    #[serde(default)]
    pub location_id: Option<Value>,
    /// New available quantity.
    #[serde(default)]
    pub available: Option<Value>,
}

/// Numeric admin ID from `808950810`, `"808950810"` or
/// `"gid://shopify/InventoryItem/808950810"`.
fn admin_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().rsplit('/').next()?.parse().ok(),
        _ => None,
    }
}

fn quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl UpdateInventoryRequest {
    fn into_update(self) -> Option<InventoryLevelUpdate> {
        Some(InventoryLevelUpdate {
            inventory_item_id: admin_id(self.inventory_item_id.as_ref()?)?,
            location_id: admin_id(self.location_id.as_ref()?)?,
            available: quantity(self.available.as_ref()?)?,
        })
    }
}

/// Set the available quantity of an inventory item at a location.
#[instrument(skip_all)]
pub async fn update_inventory(
    _admin: RequireAdminSecret,
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateInventoryRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;
    let update = request.into_update().ok_or_else(|| {
        AppError::BadRequest(
            "Invalid request: inventoryItemId, locationId, and available are required"
                .to_string(),
        )
    })?;

    let level = admin_client(&state)?.set_inventory_level(update).await?;

    Ok(Json(json!({ "success": true, "inventoryLevel": level })))
}

/// Product creation form.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Admin API product object, passed through unchanged.
    #[serde(default)]
    pub product: Option<Value>,
}

/// Create a product.
#[instrument(skip_all)]
pub async fn create_product(
    _admin: RequireAdminSecret,
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;
    let product = request
        .product
        .filter(Value::is_object)
        .ok_or_else(|| {
            AppError::BadRequest("Invalid request: product object required".to_string())
        })?;

    let created = admin_client(&state)?.create_product(product).await?;

    Ok(Json(json!({ "success": true, "product": created })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_request_requires_all_fields() {
        let full: UpdateInventoryRequest = serde_json::from_str(
            r#"{"inventoryItemId": 808950810, "locationId": 655441491, "available": 0}"#,
        )
        .unwrap();
        let update = full.into_update().unwrap();
        assert_eq!(update.inventory_item_id, 808_950_810);
        assert_eq!(update.available, 0);

        let partial: UpdateInventoryRequest =
            serde_json::from_str(r#"{"inventoryItemId": 1, "locationId": 2}"#).unwrap();
        assert!(partial.into_update().is_none());
    }

    #[test]
    fn test_inventory_request_accepts_string_ids() {
        let request: UpdateInventoryRequest = serde_json::from_str(
            r#"{"inventoryItemId": "808950810", "locationId": "gid://shopify/Location/655441491", "available": "12"}"#,
        )
        .unwrap();
        let update = request.into_update().unwrap();
        assert_eq!(update.inventory_item_id, 808_950_810);
        assert_eq!(update.location_id, 655_441_491);
        assert_eq!(update.available, 12);

        let unusable: UpdateInventoryRequest = serde_json::from_str(
            r#"{"inventoryItemId": "abc", "locationId": 2, "available": -1.5}"#,
        )
        .unwrap();
        assert!(unusable.into_update().is_none());
    }
}
