//! Shopify webhook signature verification and ingestion.
//!
//! Shopify signs every webhook delivery with HMAC-SHA256 over the raw request
//! body, keyed by the app's webhook secret, and sends the base64 digest in the
//! `X-Shopify-Hmac-Sha256` header.
//!
//! The signature covers the exact wire bytes. Anything that re-serializes the
//! body first (reordering keys, normalizing whitespace) invalidates it, so the
//! body must reach [`WebhookGate::ingest`] untouched and is only parsed after
//! the signature has been accepted.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC-SHA256 of the raw body.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
/// Header naming the webhook topic (e.g. `orders/create`).
pub const TOPIC_HEADER: &str = "x-shopify-topic";
/// Header with a unique ID per webhook delivery, stable across retries.
pub const WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";
/// Header with the shop's `myshopify.com` domain.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Compute the base64 HMAC-SHA256 signature Shopify would send for `raw_body`.
#[must_use]
pub fn compute_signature(raw_body: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length, so this never fails in practice
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(raw_body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature against the raw body.
///
/// Fails closed: an absent or empty header or secret returns `false` without
/// computing anything. The comparison runs in time that depends only on the
/// length of the expected digest, never on the header contents.
#[must_use]
pub fn verify_hmac(raw_body: &[u8], signature_header: Option<&str>, secret: Option<&str>) -> bool {
    let Some(header) = signature_header.map(str::trim).filter(|h| !h.is_empty()) else {
        return false;
    };
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return false;
    };

    let expected = compute_signature(raw_body, secret);
    if expected.is_empty() {
        return false;
    }

    constant_time_eq(expected.as_bytes(), header.as_bytes())
}

/// Compare `provided` against `expected` without short-circuiting.
///
/// Every byte of `expected` is visited whatever the length or content of
/// `provided`; a length mismatch is folded into the result at the end.
fn constant_time_eq(expected: &[u8], provided: &[u8]) -> bool {
    let same_len = (expected.len() as u64).ct_eq(&(provided.len() as u64));

    let mut same_bytes = Choice::from(1);
    for (i, byte) in expected.iter().enumerate() {
        let other = provided.get(i).copied().unwrap_or(0);
        same_bytes &= byte.ct_eq(&other);
    }

    (same_len & same_bytes).into()
}

/// Reasons the gate refuses a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookRejection {
    /// No webhook secret configured for this process.
    #[error("secret not configured")]
    SecretNotConfigured,

    /// Signature header missing or not matching the body.
    #[error("invalid signature")]
    InvalidSignature,

    /// Signature valid, but the body is not the expected JSON.
    #[error("{0}")]
    MalformedPayload(String),
}

/// One inbound webhook delivery, as read off the wire.
///
/// Constructed per request and consumed by [`WebhookGate::ingest`].
#[derive(Debug)]
pub struct WebhookEnvelope<'a> {
    /// Raw request body, exactly as received.
    pub raw_body: &'a [u8],
    /// Value of the `X-Shopify-Hmac-Sha256` header, if present.
    pub signature_header: Option<&'a str>,
}

impl<'a> WebhookEnvelope<'a> {
    /// Create an envelope from the raw body and the signature header.
    #[must_use]
    pub const fn new(raw_body: &'a [u8], signature_header: Option<&'a str>) -> Self {
        Self {
            raw_body,
            signature_header,
        }
    }
}

/// Verifies webhook deliveries and parses them once accepted.
///
/// The secret is injected at construction so callers decide where it comes
/// from (environment, tests). Each delivery is checked independently; the gate
/// keeps no state between calls.
#[derive(Clone)]
pub struct WebhookGate {
    secret: Option<SecretString>,
}

impl fmt::Debug for WebhookGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookGate")
            .field(
                "secret",
                &self.secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl WebhookGate {
    /// Create a gate with the given shared secret (`None` rejects everything).
    #[must_use]
    pub const fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    /// Whether a non-empty secret is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.configured_secret().is_some()
    }

    fn configured_secret(&self) -> Option<&str> {
        self.secret
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|s| !s.is_empty())
    }

    /// Verify a delivery and parse its body as JSON.
    ///
    /// # Errors
    ///
    /// - [`WebhookRejection::SecretNotConfigured`] when no secret is set
    /// - [`WebhookRejection::InvalidSignature`] when the HMAC does not match
    /// - [`WebhookRejection::MalformedPayload`] when the signed body is not JSON
    pub fn ingest(
        &self,
        envelope: WebhookEnvelope<'_>,
    ) -> Result<serde_json::Value, WebhookRejection> {
        self.ingest_as(envelope)
    }

    /// Verify a delivery and deserialize its body into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`WebhookGate::ingest`], with `MalformedPayload` also covering
    /// bodies that are JSON but do not match `T`.
    pub fn ingest_as<T: DeserializeOwned>(
        &self,
        envelope: WebhookEnvelope<'_>,
    ) -> Result<T, WebhookRejection> {
        let secret = self
            .configured_secret()
            .ok_or(WebhookRejection::SecretNotConfigured)?;

        if !verify_hmac(envelope.raw_body, envelope.signature_header, Some(secret)) {
            return Err(WebhookRejection::InvalidSignature);
        }

        serde_json::from_slice(envelope.raw_body)
            .map_err(|e| WebhookRejection::MalformedPayload(e.to_string()))
    }
}

/// Flat `{valid, data, error}` rendering of an ingestion result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookVerdict {
    /// Whether the delivery was accepted.
    pub valid: bool,
    /// Parsed body when accepted.
    pub data: Option<serde_json::Value>,
    /// Rejection reason when refused.
    pub error: Option<String>,
}

impl From<Result<serde_json::Value, WebhookRejection>> for WebhookVerdict {
    fn from(result: Result<serde_json::Value, WebhookRejection>) -> Self {
        match result {
            Ok(data) => Self {
                valid: true,
                data: Some(data),
                error: None,
            },
            Err(rejection) => Self {
                valid: false,
                data: None,
                error: Some(rejection.to_string()),
            },
        }
    }
}
