//! Money and price representation.
//!
//! Shopify transmits monetary values as decimal strings paired with an ISO 4217
//! currency code. [`Money`] keeps that wire form untouched; [`Price`] is the
//! parsed form used for arithmetic, backed by `rust_decimal` so totals never
//! suffer binary floating point drift.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency used to label totals when there is nothing to take a currency from.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Errors raised while interpreting monetary values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The amount string is not a decimal number.
    #[error("malformed price amount: {0:?}")]
    Malformed(String),
}

/// Monetary amount with currency code, as sent by Shopify (`MoneyV2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Create a new money value.
    #[must_use]
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// Parse the amount into a [`Price`].
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Malformed`] if the amount is not a decimal number.
    pub fn to_price(&self) -> Result<Price, PriceError> {
        let amount = Decimal::from_str(self.amount.trim())
            .map_err(|_| PriceError::Malformed(self.amount.clone()))?;
        Ok(Price::new(amount, self.currency_code.clone()))
    }
}

/// A parsed price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Amount rounded to two decimal places, e.g. `"20.00"`.
    #[must_use]
    pub fn amount_string(&self) -> String {
        let mut rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        rounded.to_string()
    }

    /// Format for display (e.g., `"19.99 USD"`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {}", self.amount_string(), self.currency_code)
    }

    /// Convert back into the wire representation.
    #[must_use]
    pub fn to_money(&self) -> Money {
        Money::new(self.amount_string(), self.currency_code.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_money_parses_decimal_string() {
        let price = Money::new("10.50", "USD").to_price().unwrap();
        assert_eq!(price.amount, Decimal::new(1050, 2));
        assert_eq!(price.currency_code, "USD");
    }

    #[test]
    fn test_money_rejects_non_numeric_amount() {
        let err = Money::new("ten dollars", "USD").to_price().unwrap_err();
        assert_eq!(err, PriceError::Malformed("ten dollars".to_string()));
    }

    #[test]
    fn test_money_rejects_empty_amount() {
        assert!(Money::new("", "USD").to_price().is_err());
    }

    #[test]
    fn test_money_wire_format_is_camel_case() {
        let money: Money =
            serde_json::from_str(r#"{"amount":"4.99","currencyCode":"CAD"}"#).unwrap();
        assert_eq!(money, Money::new("4.99", "CAD"));
    }

    #[test]
    fn test_price_display_pads_to_cents() {
        assert_eq!(Price::new(Decimal::new(20, 0), "USD").display(), "20.00 USD");
        assert_eq!(Price::new(Decimal::new(12345, 3), "EUR").display(), "12.35 EUR");
        assert_eq!(Price::zero("USD").amount_string(), "0.00");
    }
}
