//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `STOREFRONT_TOKEN` - Storefront API access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-10)
//! - `ADMIN_API_TOKEN` - Admin API access token (admin routes disabled without it)
//! - `WEBHOOK_SECRET` - Shared secret for webhook HMAC verification
//! - `DEMO_ADMIN_SECRET` - Secret expected in the `x-demo-admin-secret` header
//! - `WEBHOOK_DEDUP_TTL_SECS` - How long delivery IDs are remembered (default: 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//!
//! `NEXT_PUBLIC_SHOP_DOMAIN` and `NEXT_PUBLIC_STOREFRONT_TOKEN` are accepted
//! as fallbacks for the two required variables.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2024-10";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify API configuration
    pub shopify: ShopifyConfig,
    /// Shared secret for webhook HMAC verification
    pub webhook_secret: Option<SecretString>,
    /// How long webhook delivery IDs are remembered for deduplication
    pub webhook_dedup_ttl: Duration,
    /// Secret gating the admin API routes
    pub admin_secret: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Error event sample rate
    pub sentry_sample_rate: f32,
    /// Performance transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("shopify", &self.shopify)
            .field("webhook_secret", &redacted(self.webhook_secret.as_ref()))
            .field("webhook_dedup_ttl", &self.webhook_dedup_ttl)
            .field("admin_secret", &redacted(self.admin_secret.as_ref()))
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

/// Shopify API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2024-10)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
    /// Admin API access token (server-side only, never sent to clients)
    pub admin_api_token: Option<SecretString>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .field("admin_api_token", &redacted(self.admin_api_token.as_ref()))
            .finish()
    }
}

fn redacted(secret: Option<&SecretString>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the admin secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_env_or_default("STOREFRONT_PORT", 3000_u16)?;

        let shopify = ShopifyConfig::from_env()?;

        let webhook_secret = get_optional_env("WEBHOOK_SECRET").map(SecretString::from);
        if webhook_secret.is_none() {
            tracing::warn!("WEBHOOK_SECRET not set; webhook deliveries will be rejected");
        }
        let webhook_dedup_ttl =
            Duration::from_secs(parse_env_or_default("WEBHOOK_DEDUP_TTL_SECS", 86_400_u64)?);

        let admin_secret = get_optional_validated_secret("DEMO_ADMIN_SECRET")?;

        Ok(Self {
            host,
            port,
            shopify,
            webhook_secret,
            webhook_dedup_ttl,
            admin_secret,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    /// Load Shopify settings from environment variables.
    ///
    /// Reads `SHOP_DOMAIN` and `STOREFRONT_TOKEN` (falling back to their
    /// `NEXT_PUBLIC_` names), `SHOPIFY_API_VERSION` and `ADMIN_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store domain or Storefront token is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(get_optional_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |primary: &str, fallback: &str| {
            lookup(primary)
                .or_else(|| lookup(fallback))
                .ok_or_else(|| ConfigError::MissingEnvVar(primary.to_string()))
        };

        Ok(Self {
            store: required("SHOP_DOMAIN", "NEXT_PUBLIC_SHOP_DOMAIN")?,
            api_version: lookup("SHOPIFY_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            storefront_token: SecretString::from(required(
                "STOREFRONT_TOKEN",
                "NEXT_PUBLIC_STOREFRONT_TOKEN",
            )?),
            admin_api_token: lookup("ADMIN_API_TOKEN").map(SecretString::from),
        })
    }

    /// Storefront GraphQL endpoint for this store and API version.
    #[must_use]
    pub fn storefront_endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store, self.api_version
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (a header password must not be guessable)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate an optional secret from environment.
fn get_optional_validated_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            shopify: ShopifyConfig {
                store: "test.myshopify.com".to_string(),
                api_version: "2024-10".to_string(),
                storefront_token: SecretString::from("super_secret_storefront_token"),
                admin_api_token: Some(SecretString::from("super_secret_admin_token")),
            },
            webhook_secret: Some(SecretString::from("super_secret_webhook_key")),
            webhook_dedup_ttl: Duration::from_secs(60),
            admin_secret: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_shopify_config_accepts_public_fallback_names() {
        let config = ShopifyConfig::from_lookup(lookup(&[
            ("NEXT_PUBLIC_SHOP_DOMAIN", "demo.myshopify.com"),
            ("NEXT_PUBLIC_STOREFRONT_TOKEN", "public-token"),
        ]))
        .unwrap();

        assert_eq!(config.store, "demo.myshopify.com");
        assert_eq!(config.storefront_token.expose_secret(), "public-token");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert!(config.admin_api_token.is_none());
        assert_eq!(
            config.storefront_endpoint(),
            "https://demo.myshopify.com/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn test_shopify_config_prefers_primary_names() {
        let config = ShopifyConfig::from_lookup(lookup(&[
            ("SHOP_DOMAIN", "primary.myshopify.com"),
            ("NEXT_PUBLIC_SHOP_DOMAIN", "fallback.myshopify.com"),
            ("STOREFRONT_TOKEN", "token"),
            ("SHOPIFY_API_VERSION", "2025-01"),
        ]))
        .unwrap();

        assert_eq!(config.store, "primary.myshopify.com");
        assert_eq!(config.api_version, "2025-01");
    }

    #[test]
    fn test_shopify_config_requires_store_and_token() {
        let err = ShopifyConfig::from_lookup(lookup(&[("STOREFRONT_TOKEN", "token")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHOP_DOMAIN"));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-admin-secret-here", "DEMO_ADMIN_SECRET");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "DEMO_ADMIN_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "DEMO_ADMIN_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config());

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_storefront_token"));
        assert!(!debug_output.contains("super_secret_admin_token"));
        assert!(!debug_output.contains("super_secret_webhook_key"));
    }
}
