//! Shopify Storefront API client implementation.
//!
//! Request and response envelopes come from `graphql_client`; HTTP goes
//! through `reqwest` 0.13 directly.

pub mod queries;

use std::sync::Arc;

use graphql_client::{GraphQLQuery, Response};
use headless_shop_core::VariantId;
use headless_shop_core::cart::CheckoutLine;
use secrecy::ExposeSecret;
use tracing::instrument;

use super::{GraphQLError, ShopifyError, truncate_body};
use crate::config::ShopifyConfig;
use crate::shopify::types::{
    Checkout, Customer, CustomerAccessToken, CustomerCreateInput, UserError, VariantAvailability,
};

use queries::{
    CartCreate, CustomerAccessTokenCreate, CustomerCreate, GetCustomer, GetVariants, ShopName,
    cart_create, customer_access_token_create, customer_create, get_customer, get_variants,
    shop_name,
};

/// Header carrying the Storefront API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        Self::with_endpoint(
            config.storefront_endpoint(),
            config.storefront_token.expose_secret(),
        )
    }

    /// Create a client against an explicit GraphQL endpoint URL.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>, access_token: &str) -> Self {
        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: endpoint.into(),
                access_token: access_token.to_string(),
            }),
        }
    }

    /// GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

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

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %truncate_body(&response_text, 500),
                "Shopify Storefront API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                truncate_body(&response_text, 200)
            ))]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %truncate_body(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(
                errors = ?errors,
                operation = request_body.operation_name,
                "GraphQL errors in response"
            );
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                body = %truncate_body(&response_text, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")])
        })
    }

    // =========================================================================
    // Shop Methods
    // =========================================================================

    /// Fetch the shop name. Used to check that the access token works.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the token is rejected.
    #[instrument(skip(self))]
    pub async fn shop_name(&self) -> Result<String, ShopifyError> {
        let data = self.execute::<ShopName>(shop_name::Variables {}).await?;
        Ok(data.shop.name)
    }

    // =========================================================================
    // Inventory Methods
    // =========================================================================

    /// Look up availability for each variant, in the order given.
    ///
    /// An entry is `None` when the ID does not resolve to a product variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn variant_availability(
        &self,
        ids: &[VariantId],
    ) -> Result<Vec<Option<VariantAvailability>>, ShopifyError> {
        let variables = get_variants::Variables {
            ids: ids.iter().map(|id| id.as_str().to_string()).collect(),
        };

        let data = self.execute::<GetVariants>(variables).await?;

        Ok(data
            .nodes
            .into_iter()
            .map(|node| node.and_then(convert_variant_node))
            .collect())
    }

    // =========================================================================
    // Checkout Methods
    // =========================================================================

    /// Create a cart from the given lines and return its hosted checkout.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` with the first message if Shopify
    /// rejects the lines, or an error if the API request fails.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn create_checkout(&self, lines: &[CheckoutLine]) -> Result<Checkout, ShopifyError> {
        let variables = cart_create::Variables {
            input: cart_create::CartInput {
                lines: lines
                    .iter()
                    .map(|line| cart_create::CartLineInput {
                        merchandise_id: line.variant_id.as_str().to_string(),
                        quantity: line.quantity,
                    })
                    .collect(),
            },
        };

        let data = self.execute::<CartCreate>(variables).await?;

        let payload = data
            .cart_create
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("Failed to create checkout")]))?;

        check_user_errors(&payload.user_errors)?;

        payload
            .cart
            .map(|cart| Checkout {
                checkout_url: cart.checkout_url,
                checkout_id: cart.id,
            })
            .ok_or_else(|| {
                ShopifyError::GraphQL(vec![GraphQLError::message("Failed to create checkout")])
            })
    }

    // =========================================================================
    // Customer Methods
    // =========================================================================

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` with the first message if Shopify
    /// rejects the input (e.g., email taken), or an error if the request fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn customer_create(
        &self,
        input: CustomerCreateInput,
    ) -> Result<Customer, ShopifyError> {
        let data = self
            .execute::<CustomerCreate>(customer_create::Variables { input })
            .await?;

        let payload = data
            .customer_create
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("Signup failed")]))?;

        check_user_errors(&payload.customer_user_errors)?;

        payload
            .customer
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("Signup failed")]))
    }

    /// Exchange email and password for a customer access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` for rejected credentials, or an
    /// error if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn customer_access_token_create(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        let variables = customer_access_token_create::Variables {
            input: customer_access_token_create::Input {
                email: email.to_string(),
                password: password.to_string(),
            },
        };

        let data = self.execute::<CustomerAccessTokenCreate>(variables).await?;

        let payload = data.customer_access_token_create.ok_or_else(|| {
            ShopifyError::UserError("Invalid credentials".to_string())
        })?;

        check_user_errors(&payload.customer_user_errors)?;

        payload
            .customer_access_token
            .ok_or_else(|| ShopifyError::UserError("Invalid credentials".to_string()))
    }

    /// Fetch the customer that owns an access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the token resolves to no customer,
    /// or an error if the request fails.
    #[instrument(skip_all)]
    pub async fn customer(&self, access_token: &str) -> Result<Customer, ShopifyError> {
        let variables = get_customer::Variables {
            customer_access_token: access_token.to_string(),
        };

        let data = self.execute::<GetCustomer>(variables).await?;

        data.customer
            .ok_or_else(|| ShopifyError::NotFound("Customer not found".to_string()))
    }
}

/// Fail with the first user error, if any.
fn check_user_errors(errors: &[UserError]) -> Result<(), ShopifyError> {
    match errors.first() {
        Some(first) => {
            tracing::warn!(errors = ?errors, "Shopify mutation returned user errors");
            Err(ShopifyError::UserError(first.message.clone()))
        }
        None => Ok(()),
    }
}

fn convert_variant_node(node: get_variants::Node) -> Option<VariantAvailability> {
    let id = node.id?;
    Some(VariantAvailability {
        id: VariantId::new(id),
        title: node.title.unwrap_or_default(),
        product_title: node.product.map(|p| p.title).unwrap_or_default(),
        available_for_sale: node.available_for_sale.unwrap_or(false),
        quantity_available: node.quantity_available,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_endpoint_from_config() {
        let config = ShopifyConfig {
            store: "test.myshopify.com".to_string(),
            api_version: "2024-10".to_string(),
            storefront_token: SecretString::from("token"),
            admin_api_token: None,
        };
        let client = StorefrontClient::new(&config);
        assert_eq!(
            client.endpoint(),
            "https://test.myshopify.com/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn test_check_user_errors_uses_first_message() {
        let errors = vec![
            UserError {
                code: Some("TAKEN".to_string()),
                field: Some(vec!["input".to_string(), "email".to_string()]),
                message: "Email has already been taken".to_string(),
            },
            UserError {
                code: None,
                field: None,
                message: "Second".to_string(),
            },
        ];

        let err = check_user_errors(&errors).unwrap_err();
        assert_eq!(err.first_message(), "Email has already been taken");
        assert!(check_user_errors(&[]).is_ok());
    }

    #[test]
    fn test_convert_variant_node() {
        let node = get_variants::Node {
            id: Some("gid://shopify/ProductVariant/1".to_string()),
            title: Some("Large".to_string()),
            available_for_sale: Some(true),
            quantity_available: Some(2),
            product: Some(get_variants::Product {
                title: "Tee".to_string(),
            }),
        };

        let variant = convert_variant_node(node).unwrap();
        assert_eq!(variant.display_name(), "Tee - Large");
        assert_eq!(variant.quantity_available, Some(2));

        assert!(convert_variant_node(get_variants::Node::default()).is_none());
    }
}
