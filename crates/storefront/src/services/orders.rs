//! Processing of verified order webhooks.
//!
//! Shopify may deliver the same webhook more than once. Deliveries are keyed
//! by the `X-Shopify-Webhook-Id` header and remembered for a fixed window;
//! a repeat within that window is acknowledged without being processed again.
//! Deliveries without the header are always processed.

use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

/// Delivery IDs remembered at most.
const MAX_TRACKED_DELIVERIES: u64 = 10_000;

/// An order as sent in `orders/*` webhook payloads.
///
/// Built leniently from the verified JSON: a field that is missing, `null`, or
/// of an unexpected type is left empty rather than rejecting the delivery.
/// Shopify retries any non-2xx response, so a payload that verified is always
/// acknowledged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderNotification {
    /// Admin order ID.
    pub id: Value,
    /// Sequential order number, as sent (number or string).
    pub order_number: Option<String>,
    /// Display name (e.g., "#1001").
    pub name: Option<String>,
    /// Order contact email.
    pub email: Option<String>,
    /// Customer email, absent for guest checkouts.
    pub customer_email: Option<String>,
    /// Order total as a decimal string.
    pub total_price: Option<String>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Purchased lines.
    pub line_items: Vec<OrderLineItem>,
}

/// A purchased line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLineItem {
    /// Line name (product and variant title).
    pub name: Option<String>,
    /// Units purchased.
    pub quantity: u64,
    /// Unit price as a decimal string.
    pub price: Option<String>,
}

/// A string or number field rendered as text; anything else is absent.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn quantity(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

impl From<&Value> for OrderLineItem {
    fn from(item: &Value) -> Self {
        Self {
            name: text(item.get("name")),
            quantity: quantity(item.get("quantity")),
            price: text(item.get("price")),
        }
    }
}

impl From<&Value> for OrderNotification {
    fn from(payload: &Value) -> Self {
        Self {
            id: payload.get("id").cloned().unwrap_or_default(),
            order_number: text(payload.get("order_number")),
            name: text(payload.get("name")),
            email: text(payload.get("email")),
            customer_email: text(payload.pointer("/customer/email")),
            total_price: text(payload.get("total_price")),
            currency: text(payload.get("currency")),
            line_items: payload
                .get("line_items")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(OrderLineItem::from).collect())
                .unwrap_or_default(),
        }
    }
}

impl OrderNotification {
    /// Order number, falling back to the display name.
    #[must_use]
    pub fn reference(&self) -> String {
        self.order_number
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Customer email, or `"Guest"` for guest checkouts.
    #[must_use]
    pub fn customer_label(&self) -> &str {
        self.customer_email
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Guest")
    }
}

/// Result of handing a delivery to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The order was processed.
    Processed,
    /// The delivery was seen before and skipped.
    Duplicate,
}

/// Handles verified order webhooks.
#[derive(Clone)]
pub struct OrderWebhookService {
    seen: Cache<String, ()>,
}

impl OrderWebhookService {
    /// Create a service remembering delivery IDs for `dedup_ttl`.
    #[must_use]
    pub fn new(dedup_ttl: Duration) -> Self {
        Self {
            seen: Cache::builder()
                .max_capacity(MAX_TRACKED_DELIVERIES)
                .time_to_live(dedup_ttl)
                .build(),
        }
    }

    /// Process an order unless this delivery was already handled.
    pub async fn handle(
        &self,
        webhook_id: Option<&str>,
        order: &OrderNotification,
    ) -> ProcessOutcome {
        if let Some(id) = webhook_id.filter(|id| !id.is_empty()) {
            let entry = self.seen.entry(id.to_string()).or_insert(()).await;
            if !entry.is_fresh() {
                tracing::info!(webhook_id = id, order_id = %order.id, "Duplicate webhook delivery skipped");
                return ProcessOutcome::Duplicate;
            }
        }

        log_order(webhook_id, order);
        ProcessOutcome::Processed
    }
}

impl std::fmt::Debug for OrderWebhookService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderWebhookService")
            .field("tracked_deliveries", &self.seen.entry_count())
            .finish()
    }
}

fn log_order(webhook_id: Option<&str>, order: &OrderNotification) {
    tracing::info!(
        webhook_id = webhook_id.unwrap_or("-"),
        order_id = %order.id,
        order_number = %order.reference(),
        customer = order.customer_label(),
        total = order.total_price.as_deref().unwrap_or("0.00"),
        currency = order.currency.as_deref().unwrap_or("-"),
        line_items = order.line_items.len(),
        "Order webhook received and verified"
    );

    for (idx, item) in order.line_items.iter().enumerate() {
        tracing::info!(
            order_id = %order.id,
            line = idx + 1,
            name = item.name.as_deref().unwrap_or("-"),
            quantity = item.quantity,
            price = item.price.as_deref().unwrap_or("-"),
            currency = order.currency.as_deref().unwrap_or("-"),
            "Order line item"
        );
    }
}
