//! Client-side cart state and its reducer.
//!
//! A [`Cart`] is an ordered list of line items keyed by variant. It never holds
//! two entries for the same variant and never holds an entry with quantity 0:
//! lowering a quantity to zero removes the line. Aggregates (item count, total)
//! are derived on read.
//!
//! The cart serializes as a plain JSON array of line items so it can be stored
//! under a single key in client-local storage (see [`crate::storage`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::Reducer;
use crate::types::{DEFAULT_CURRENCY, Money, Price, PriceError, VariantId};

/// Errors raised while deriving cart aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A line item carries a price that is not a decimal number.
    #[error("line item {variant_id} has an invalid price: {source}")]
    InvalidPrice {
        /// Variant whose price failed to parse.
        variant_id: VariantId,
        /// Underlying parse failure.
        source: PriceError,
    },

    /// The total does not fit in a decimal.
    #[error("cart total overflowed")]
    Overflow,
}

/// A single product variant in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Shopify variant GID; unique within a cart.
    pub variant_id: VariantId,
    /// Product title.
    pub title: String,
    /// Variant title (e.g., "Large / Blue").
    #[serde(default)]
    pub variant_title: String,
    /// Price of one unit.
    #[serde(alias = "price")]
    pub unit_price: Money,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Units of this variant, always at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl CartLineItem {
    /// Create a line item with quantity 1.
    #[must_use]
    pub fn new(
        variant_id: impl Into<VariantId>,
        title: impl Into<String>,
        variant_title: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            title: title.into(),
            variant_title: variant_title.into(),
            unit_price,
            image_url: None,
            quantity: 1,
        }
    }

    /// Attach an image URL.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] if the unit price is malformed, or
    /// [`CartError::Overflow`] if the product does not fit in a decimal.
    pub fn line_total(&self) -> Result<Price, CartError> {
        let unit = self
            .unit_price
            .to_price()
            .map_err(|source| CartError::InvalidPrice {
                variant_id: self.variant_id.clone(),
                source,
            })?;
        let amount = unit
            .amount
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(CartError::Overflow)?;
        Ok(Price::new(amount, unit.currency_code))
    }
}

/// A variant and quantity pair handed to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    /// Shopify variant GID.
    pub variant_id: VariantId,
    /// Units requested.
    pub quantity: u32,
}

/// A state transition on the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CartAction {
    /// Add one unit of a variant. An existing line is incremented and keeps
    /// its stored title and price; a new line is appended with quantity 1.
    AddItem {
        /// Item to add; its `quantity` is ignored.
        item: CartLineItem,
    },
    /// Replace a line's quantity. Zero or below removes the line.
    SetQuantity {
        /// Variant to update.
        variant_id: VariantId,
        /// New quantity.
        quantity: i64,
    },
    /// Remove a line if present.
    RemoveItem {
        /// Variant to remove.
        variant_id: VariantId,
    },
    /// Empty the cart.
    Clear,
}

/// Ordered collection of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored items, restoring the cart invariants.
    ///
    /// Lines with quantity 0 are dropped and repeated variants are merged into
    /// the first occurrence, so a hand-edited or stale stored value can never
    /// produce an invalid cart.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            if let Some(existing) = cart.find_mut(&item.variant_id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                cart.items.push(item);
            }
        }
        cart
    }

    /// Apply an action, returning the next cart.
    #[must_use]
    pub fn apply(mut self, action: CartAction) -> Self {
        match action {
            CartAction::AddItem { item } => {
                if let Some(existing) = self.find_mut(&item.variant_id) {
                    existing.quantity = existing.quantity.saturating_add(1);
                } else {
                    self.items.push(CartLineItem { quantity: 1, ..item });
                }
            }
            CartAction::SetQuantity {
                variant_id,
                quantity,
            } => {
                if quantity <= 0 {
                    self.items.retain(|i| i.variant_id != variant_id);
                } else if let Some(existing) = self.find_mut(&variant_id) {
                    existing.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                }
            }
            CartAction::RemoveItem { variant_id } => {
                self.items.retain(|i| i.variant_id != variant_id);
            }
            CartAction::Clear => self.items.clear(),
        }
        self
    }

    fn find_mut(&mut self, variant_id: &VariantId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|i| &i.variant_id == variant_id)
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up a line by variant.
    #[must_use]
    pub fn get(&self, variant_id: &VariantId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.variant_id == variant_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Currency of the first line, used to label the total.
    #[must_use]
    pub fn currency_code(&self) -> Option<&str> {
        self.items
            .first()
            .map(|i| i.unit_price.currency_code.as_str())
    }

    /// Whether lines are priced in more than one currency.
    ///
    /// Mixed-currency carts are not reconciled: [`Cart::total`] still sums the
    /// raw amounts and labels the result with the first line's currency.
    #[must_use]
    pub fn has_mixed_currencies(&self) -> bool {
        self.currency_code().is_some_and(|first| {
            self.items
                .iter()
                .any(|i| i.unit_price.currency_code != first)
        })
    }

    /// Sum of unit price times quantity over all lines.
    ///
    /// An empty cart totals zero in [`DEFAULT_CURRENCY`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] naming the first line whose price
    /// is not a decimal number, or [`CartError::Overflow`].
    pub fn total(&self) -> Result<Price, CartError> {
        let currency = self.currency_code().unwrap_or(DEFAULT_CURRENCY).to_owned();

        let mut sum = Decimal::ZERO;
        for item in &self.items {
            let line = item.line_total()?;
            sum = sum.checked_add(line.amount).ok_or(CartError::Overflow)?;
        }

        Ok(Price::new(sum, currency))
    }

    /// Variant and quantity pairs for the checkout handoff.
    #[must_use]
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items
            .iter()
            .map(|i| CheckoutLine {
                variant_id: i.variant_id.clone(),
                quantity: i.quantity,
            })
            .collect()
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl Reducer for Cart {
    type Action = CartAction;

    fn reduce(self, action: CartAction) -> Self {
        self.apply(action)
    }
}
