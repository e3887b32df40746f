//! Business logic services for storefront.
//!
//! # Services
//!
//! - `orders` - Order webhook processing and delivery deduplication

pub mod orders;

pub use orders::{OrderNotification, OrderWebhookService, ProcessOutcome};
