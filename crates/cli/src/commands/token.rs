//! Verify Storefront API credentials.

use headless_shop_storefront::config::ShopifyConfig;
use headless_shop_storefront::shopify::StorefrontClient;
use tracing::info;

/// Fetch the shop name with the configured Storefront token.
///
/// Uses the same variables as the server: `SHOP_DOMAIN` and
/// `STOREFRONT_TOKEN` (or their `NEXT_PUBLIC_` names) and optionally
/// `SHOPIFY_API_VERSION`.
///
/// # Errors
///
/// Returns an error if a variable is missing or Shopify rejects the request.
pub async fn check() -> Result<(), Box<dyn std::error::Error>> {
    let config = ShopifyConfig::from_env()?;
    let client = StorefrontClient::new(&config);
    info!(endpoint = %client.endpoint(), "Checking Storefront API token");

    let name = client.shop_name().await?;

    info!(shop = %name, "Storefront token is valid");
    Ok(())
}
