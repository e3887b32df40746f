//! Application state shared across handlers.

use std::sync::Arc;

use headless_shop_core::webhook::WebhookGate;
use secrecy::SecretString;

use crate::config::StorefrontConfig;
use crate::services::OrderWebhookService;
use crate::shopify::{AdminClient, ShopifyError, StorefrontClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like API clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    admin: Option<AdminClient>,
    webhook_gate: WebhookGate,
    orders: OrderWebhookService,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// The admin client is only built when `ADMIN_API_TOKEN` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ShopifyError> {
        let storefront = StorefrontClient::new(&config.shopify);
        let admin = config
            .shopify
            .admin_api_token
            .as_ref()
            .map(|token| {
                AdminClient::new(&config.shopify.store, &config.shopify.api_version, token)
            })
            .transpose()?;

        Ok(Self::with_clients(config, storefront, admin))
    }

    /// Create state around existing clients.
    #[must_use]
    pub fn with_clients(
        config: StorefrontConfig,
        storefront: StorefrontClient,
        admin: Option<AdminClient>,
    ) -> Self {
        let webhook_gate = WebhookGate::new(config.webhook_secret.clone());
        let orders = OrderWebhookService::new(config.webhook_dedup_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                admin,
                webhook_gate,
                orders,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get the Shopify Admin API client, if configured.
    #[must_use]
    pub fn admin(&self) -> Option<&AdminClient> {
        self.inner.admin.as_ref()
    }

    /// Get the webhook verification gate.
    #[must_use]
    pub fn webhook_gate(&self) -> &WebhookGate {
        &self.inner.webhook_gate
    }

    /// Get the order webhook service.
    #[must_use]
    pub fn orders(&self) -> &OrderWebhookService {
        &self.inner.orders
    }

    /// Get the secret gating the admin routes, if configured.
    #[must_use]
    pub fn admin_secret(&self) -> Option<&SecretString> {
        self.inner.config.admin_secret.as_ref()
    }
}
