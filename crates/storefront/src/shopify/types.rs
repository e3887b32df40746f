//! Domain types for the Shopify APIs.
//!
//! These types provide a clean API separate from the raw GraphQL response
//! shapes in `storefront::queries`. They serialize in camelCase because
//! route handlers return them to browser clients as-is.

use headless_shop_core::VariantId;
use serde::{Deserialize, Serialize};

// =============================================================================
// Inventory Types
// =============================================================================

/// Availability of a single product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantAvailability {
    /// Shopify variant GID.
    pub id: VariantId,
    /// Variant title (e.g., "Large / Blue").
    pub title: String,
    /// Title of the owning product.
    pub product_title: String,
    /// Whether the variant can be purchased at all.
    pub available_for_sale: bool,
    /// Units in stock; `None` when inventory is not tracked.
    pub quantity_available: Option<i64>,
}

impl VariantAvailability {
    /// Name shown to shoppers, e.g. `"Pineapple Tee - Large"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.product_title, self.title)
    }

    /// Whether `requested` units can be ordered.
    #[must_use]
    pub fn can_fulfil(&self, requested: u32) -> bool {
        self.available_for_sale
            && self
                .quantity_available
                .is_none_or(|available| i64::from(requested) <= available)
    }
}

// =============================================================================
// Checkout Types
// =============================================================================

/// A hosted checkout created from cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    /// URL the shopper is redirected to.
    pub checkout_url: String,
    /// Shopify cart GID backing the checkout.
    pub checkout_id: String,
}

// =============================================================================
// Customer Types
// =============================================================================

/// Input for creating a customer account.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreateInput {
    /// Email address (login identifier).
    pub email: String,
    /// Account password.
    pub password: String,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl std::fmt::Debug for CustomerCreateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerCreateInput")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// A Shopify customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Customer GID.
    pub id: String,
    /// Email address.
    pub email: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

/// Customer access token issued at login.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessToken {
    /// Bearer token for customer-scoped queries.
    pub access_token: String,
    /// Expiry timestamp (ISO 8601).
    pub expires_at: String,
}

impl std::fmt::Debug for CustomerAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerAccessToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Validation error returned by a Storefront mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Field path that caused the error.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    /// Human-readable error message.
    pub message: String,
}

// =============================================================================
// Admin Types
// =============================================================================

/// Absolute inventory level for an item at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLevelUpdate {
    /// Admin inventory item ID.
    pub inventory_item_id: u64,
    /// Admin location ID.
    pub location_id: u64,
    /// New available quantity.
    pub available: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant(available_for_sale: bool, quantity_available: Option<i64>) -> VariantAvailability {
        VariantAvailability {
            id: VariantId::new("gid://shopify/ProductVariant/1"),
            title: "Large".to_string(),
            product_title: "Pineapple Tee".to_string(),
            available_for_sale,
            quantity_available,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(variant(true, None).display_name(), "Pineapple Tee - Large");
    }

    #[test]
    fn test_can_fulfil() {
        assert!(variant(true, None).can_fulfil(1_000));
        assert!(variant(true, Some(3)).can_fulfil(3));
        assert!(!variant(true, Some(3)).can_fulfil(4));
        assert!(!variant(false, None).can_fulfil(1));
    }

    #[test]
    fn test_secret_fields_redacted() {
        let input = CustomerCreateInput {
            email: "a@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            first_name: None,
            last_name: None,
        };
        let token = CustomerAccessToken {
            access_token: "tok_abcdef".to_string(),
            expires_at: "2030-01-01T00:00:00Z".to_string(),
        };

        assert!(!format!("{input:?}").contains("hunter2"));
        assert!(!format!("{token:?}").contains("tok_abcdef"));
    }

    #[test]
    fn test_checkout_serializes_camel_case() {
        let checkout = Checkout {
            checkout_url: "https://shop.example/checkouts/1".to_string(),
            checkout_id: "gid://shopify/Cart/1".to_string(),
        };
        let json = serde_json::to_value(&checkout).unwrap();
        assert_eq!(json["checkoutUrl"], "https://shop.example/checkouts/1");
        assert_eq!(json["checkoutId"], "gid://shopify/Cart/1");
    }
}
