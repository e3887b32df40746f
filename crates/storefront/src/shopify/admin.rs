//! Shopify Admin REST API client.
//!
//! Holds the server-side `ADMIN_API_TOKEN`. Responses are passed through as
//! JSON since the admin routes proxy them to the caller unchanged.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ShopifyError, truncate_body};
use crate::shopify::types::InventoryLevelUpdate;

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Client for the Shopify Admin REST API.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    /// Create a new Admin API client for `store` (e.g., `shop.myshopify.com`).
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(store: &str, api_version: &str, token: &SecretString) -> Result<Self, ShopifyError> {
        Self::with_base_url(format!("https://{store}/admin/api/{api_version}"), token)
    }

    /// Create a client against an explicit base URL (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: &SecretString,
    ) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();

        let mut token_value = HeaderValue::from_str(token.expose_secret())
            .map_err(|e| ShopifyError::UserError(format!("Invalid admin token format: {e}")))?;
        token_value.set_sensitive(true);
        headers.insert(ACCESS_TOKEN_HEADER, token_value);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                base_url: base_url.into(),
            }),
        })
    }

    /// Base URL every request path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Issue a request against `path` (e.g., `/orders.json`).
    ///
    /// GET requests never carry a body, even if one is given.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Admin` with the upstream `errors` field on a
    /// non-success status, or an error if the request fails.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ShopifyError> {
        let url = format!("{}{path}", self.inner.base_url);
        let is_get = method == Method::GET;

        let mut request = self.inner.client.request(method, &url);
        if let Some(body) = body.filter(|_| !is_get) {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate_body(&response_text, 500),
                "Shopify Admin API returned non-success status"
            );
            return Err(ShopifyError::Admin {
                status: status.as_u16(),
                message: admin_error_message(&response_text, status),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate_body(&response_text, 500),
                "Failed to parse Shopify Admin response"
            );
            ShopifyError::Parse(e)
        })
    }

    /// Fetch the most recent orders in any status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn recent_orders(&self, limit: u32) -> Result<Vec<Value>, ShopifyError> {
        let path = format!("/orders.json?limit={limit}&status=any");
        let mut result = self.request(Method::GET, &path, None).await?;

        Ok(match result.get_mut("orders").map(Value::take) {
            Some(Value::Array(orders)) => orders,
            _ => Vec::new(),
        })
    }

    /// Set the available quantity of an inventory item at a location.
    ///
    /// Returns the updated inventory level.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn set_inventory_level(
        &self,
        update: InventoryLevelUpdate,
    ) -> Result<Value, ShopifyError> {
        let body = json!({
            "inventory_item_id": update.inventory_item_id,
            "location_id": update.location_id,
            "available": update.available,
        });
        let mut result = self
            .request(Method::POST, "/inventory_levels/set.json", Some(&body))
            .await?;

        tracing::info!(
            inventory_item_id = update.inventory_item_id,
            location_id = update.location_id,
            available = update.available,
            "Inventory level updated"
        );

        Ok(result
            .get_mut("inventory_level")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Create a product from an Admin API product object.
    ///
    /// Returns the created product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or Shopify rejects the product.
    pub async fn create_product(&self, product: Value) -> Result<Value, ShopifyError> {
        let body = json!({ "product": product });
        let mut result = self
            .request(Method::POST, "/products.json", Some(&body))
            .await?;

        let created = result
            .get_mut("product")
            .map(Value::take)
            .unwrap_or(Value::Null);

        let product_id = created.get("id").cloned().unwrap_or_default();
        tracing::info!(%product_id, "Product created");

        Ok(created)
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Flatten the `errors` field of an Admin error body into one line.
///
/// Shopify returns a string, a list, or a `{field: [messages]}` map.
fn admin_error_message(body: &str, status: reqwest::StatusCode) -> String {
    let errors = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|mut v| v.get_mut("errors").map(Value::take));

    match errors {
        Some(Value::String(message)) => message,
        Some(Value::Array(items)) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join("; "),
        Some(Value::Object(fields)) => fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", value_text(messages)))
            .collect::<Vec<_>>()
            .join("; "),
        _ => format!("Admin API request failed with status {status}"),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        let client = AdminClient::new(
            "test.myshopify.com",
            "2024-10",
            &SecretString::from("shpat_test"),
        )
        .unwrap();
        assert_eq!(
            client.base_url(),
            "https://test.myshopify.com/admin/api/2024-10"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let client = AdminClient::new(
            "test.myshopify.com",
            "2024-10",
            &SecretString::from("shpat_test"),
        )
        .unwrap();
        assert!(!format!("{client:?}").contains("shpat_test"));
    }

    #[test]
    fn test_admin_error_message_string() {
        let message = admin_error_message(
            r#"{"errors": "[API] Invalid API key"}"#,
            reqwest::StatusCode::UNAUTHORIZED,
        );
        assert_eq!(message, "[API] Invalid API key");
    }

    #[test]
    fn test_admin_error_message_field_map() {
        let message = admin_error_message(
            r#"{"errors": {"title": ["can't be blank"]}}"#,
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
        );
        assert_eq!(message, "title: can't be blank");
    }

    #[test]
    fn test_admin_error_message_unparseable() {
        let message = admin_error_message("<html>", reqwest::StatusCode::BAD_GATEWAY);
        assert!(message.contains("502"));
    }
}
