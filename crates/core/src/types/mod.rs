//! Core types for Headless Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;

pub use id::*;
pub use price::{DEFAULT_CURRENCY, Money, Price, PriceError};
