//! Headless Shop Core - Domain logic shared by the storefront server and CLI.
//!
//! This crate provides the pieces of the shop that carry real invariants:
//! - `storefront` - Public HTTP server (webhooks, checkout, admin proxy)
//! - `cli` - Operator tooling and the local cart client
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions, and a small storage
//! trait - no async, no HTTP clients. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Money, prices, and Shopify GID newtypes
//! - [`webhook`] - HMAC verification and the webhook ingestion gate
//! - [`cart`] - Cart state and reducer
//! - [`wishlist`] - Wishlist state and reducer
//! - [`storage`] - Client-local persistence of reducer state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod storage;
pub mod types;
pub mod webhook;
pub mod wishlist;

pub use types::*;
