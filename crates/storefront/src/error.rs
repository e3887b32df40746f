//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error body is JSON: `{"error": "..."}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use headless_shop_core::webhook::WebhookRejection;
use serde_json::json;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Webhook delivery was rejected by the gate.
    #[error("Webhook rejected: {0}")]
    Webhook(#[from] WebhookRejection),

    /// Required server configuration is missing.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body was not the expected JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] JsonRejection),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(rejection) => rejection.status(),
            Self::Shopify(ShopifyError::UserError(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Shopify(ShopifyError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Shopify(_) | Self::NotConfigured(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Webhook(rejection) => match rejection {
                WebhookRejection::SecretNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
                WebhookRejection::InvalidSignature => StatusCode::UNAUTHORIZED,
                WebhookRejection::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    pub(crate) fn client_message(&self) -> String {
        match self {
            Self::InvalidJson(rejection) => format!("Invalid request: {}", rejection.body_text()),
            // Upstream messages are passed through (first error only)
            Self::Shopify(err) => err.first_message(),
            Self::Webhook(WebhookRejection::SecretNotConfigured) => {
                "Webhook secret not configured".to_string()
            }
            // Never describe why a signature failed
            Self::Webhook(WebhookRejection::InvalidSignature) => {
                "Unauthorized: Invalid webhook signature".to_string()
            }
            Self::Webhook(WebhookRejection::MalformedPayload(msg)) => {
                format!("Invalid webhook payload: {msg}")
            }
            Self::NotConfigured(what) => format!("{what} not configured"),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Log the error, capturing server errors to Sentry.
    pub(crate) fn report(&self) {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
