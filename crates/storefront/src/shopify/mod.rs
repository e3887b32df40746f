//! Shopify Storefront (GraphQL) and Admin (REST) API clients.
//!
//! # APIs
//!
//! ## Storefront API
//! - Shop info, variant availability, cart-based checkout
//! - Customer signup and login
//!
//! ## Admin API
//! - Orders, inventory levels, product creation
//! - Server-held access token, never exposed to clients
//!
//! Neither client retries. Failures propagate to the caller with the first
//! upstream error message.
//!
//! # Example
//!
//! ```rust,ignore
//! use headless_shop_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify);
//! let checkout = client.create_checkout(&cart.checkout_lines()).await?;
//! println!("{}", checkout.checkout_url);
//! ```

mod admin;
mod storefront;
pub mod types;

pub use admin::AdminClient;
pub use storefront::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// Admin REST API returned a non-success status.
    #[error("Admin API error ({status}): {message}")]
    Admin {
        /// HTTP status returned by Shopify.
        status: u16,
        /// The upstream `errors` field, flattened to text.
        message: String,
    },
}

impl ShopifyError {
    /// The first upstream error message, suitable for returning to callers.
    #[must_use]
    pub fn first_message(&self) -> String {
        match self {
            Self::GraphQL(errors) => errors
                .iter()
                .map(|e| e.message.trim())
                .find(|m| !m.is_empty())
                .map_or_else(|| format_graphql_errors(errors), str::to_string),
            Self::UserError(message) | Self::NotFound(message) => message.clone(),
            Self::Admin { message, .. } => message.clone(),
            Self::Http(_) | Self::Parse(_) | Self::RateLimited(_) => self.to_string(),
        }
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(e: graphql_client::Error) -> Self {
        Self {
            message: e.message,
            locations: e.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: e.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                        graphql_client::PathFragment::Index(i) => {
                            serde_json::Value::Number(i.into())
                        }
                    })
                    .collect()
            }),
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Truncate an upstream body for logging.
fn truncate_body(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::NotFound("variant-123".to_string());
        assert_eq!(err.to_string(), "Not found: variant-123");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError::message("Field not found"),
            GraphQLError::message("Invalid ID"),
        ];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_empty_messages() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("nodes".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = ShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: nodes.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = ShopifyError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_first_message_graphql() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError::message(""),
            GraphQLError::message("Access denied"),
            GraphQLError::message("Throttled"),
        ]);
        assert_eq!(err.first_message(), "Access denied");
    }

    #[test]
    fn test_first_message_user_and_admin_errors() {
        let err = ShopifyError::UserError("Email has already been taken".to_string());
        assert_eq!(err.first_message(), "Email has already been taken");

        let err = ShopifyError::Admin {
            status: 422,
            message: "title: can't be blank".to_string(),
        };
        assert_eq!(err.first_message(), "title: can't be blank");
        assert_eq!(err.to_string(), "Admin API error (422): title: can't be blank");
    }

    #[test]
    fn test_graphql_client_error_conversion() {
        let raw = r#"{"message": "Bad id", "locations": [{"line": 2, "column": 3}], "path": ["nodes", 1]}"#;
        let e: graphql_client::Error = serde_json::from_str(raw).unwrap();
        let converted = GraphQLError::from(e);

        assert_eq!(converted.message, "Bad id");
        assert_eq!(converted.locations.first().map(|l| l.line), Some(2));
        assert_eq!(converted.path.len(), 2);
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ShopifyError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("abcdef", 3), "abc");
        assert_eq!(truncate_body("ab", 3), "ab");
    }
}
