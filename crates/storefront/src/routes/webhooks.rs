//! Shopify webhook receivers.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use headless_shop_core::webhook::{
    HMAC_HEADER, SHOP_DOMAIN_HEADER, TOPIC_HEADER, WEBHOOK_ID_HEADER, WebhookEnvelope,
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::services::{OrderNotification, ProcessOutcome};
use crate::state::AppState;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Receive an order webhook.
///
/// The raw body is verified before it is parsed. Only a body that is not JSON
/// is rejected; fields of an unexpected shape are read as absent. A repeated
/// delivery is acknowledged with the same `{"status": "ok"}` as the first one.
#[instrument(
    skip_all,
    fields(
        topic = header_str(&headers, TOPIC_HEADER).unwrap_or("-"),
        shop = header_str(&headers, SHOP_DOMAIN_HEADER).unwrap_or("-"),
    )
)]
pub async fn orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let envelope = WebhookEnvelope::new(&body, header_str(&headers, HMAC_HEADER));

    let payload = state
        .webhook_gate()
        .ingest(envelope)
        .inspect_err(|e| tracing::warn!(error = %e, "Webhook verification failed"))?;
    let order = OrderNotification::from(&payload);

    let outcome = state
        .orders()
        .handle(header_str(&headers, WEBHOOK_ID_HEADER), &order)
        .await;

    if outcome == ProcessOutcome::Duplicate {
        tracing::debug!("Acknowledging duplicate delivery");
    }

    Ok(Json(json!({ "status": "ok" })))
}
