//! Client-side wishlist: an ordered set of saved variants.

use serde::{Deserialize, Serialize};

use crate::storage::Reducer;
use crate::types::{Money, VariantId};

/// A saved product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// Shopify variant GID; unique within a wishlist.
    pub variant_id: VariantId,
    /// Product title.
    pub title: String,
    /// Product handle, for linking back to the product page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Price when the item was saved.
    #[serde(default, alias = "price", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl WishlistItem {
    /// Create a wishlist item with only the required fields.
    #[must_use]
    pub fn new(variant_id: impl Into<VariantId>, title: impl Into<String>) -> Self {
        Self {
            variant_id: variant_id.into(),
            title: title.into(),
            handle: None,
            unit_price: None,
            image_url: None,
        }
    }
}

/// A state transition on the wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WishlistAction {
    /// Save an item; no-op if the variant is already saved.
    Add {
        /// Item to save.
        item: WishlistItem,
    },
    /// Forget a variant if saved.
    Remove {
        /// Variant to forget.
        variant_id: VariantId,
    },
}

/// Saved items in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<WishlistItem>", into = "Vec<WishlistItem>")]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    /// An empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Apply an action, returning the next wishlist.
    #[must_use]
    pub fn apply(mut self, action: WishlistAction) -> Self {
        match action {
            WishlistAction::Add { item } => {
                if !self.contains(&item.variant_id) {
                    self.items.push(item);
                }
            }
            WishlistAction::Remove { variant_id } => {
                self.items.retain(|i| i.variant_id != variant_id);
            }
        }
        self
    }

    /// Whether a variant is saved.
    #[must_use]
    pub fn contains(&self, variant_id: &VariantId) -> bool {
        self.items.iter().any(|i| &i.variant_id == variant_id)
    }

    /// Saved items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    /// Number of saved items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<WishlistItem>> for Wishlist {
    fn from(items: Vec<WishlistItem>) -> Self {
        items
            .into_iter()
            .fold(Self::new(), |list, item| list.apply(WishlistAction::Add { item }))
    }
}

impl From<Wishlist> for Vec<WishlistItem> {
    fn from(list: Wishlist) -> Self {
        list.items
    }
}

impl Reducer for Wishlist {
    type Action = WishlistAction;

    fn reduce(self, action: WishlistAction) -> Self {
        self.apply(action)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn add(variant: &str) -> WishlistAction {
        WishlistAction::Add {
            item: WishlistItem::new(variant, "Pineapple Tee"),
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let list = Wishlist::new().apply(add("A")).apply(add("A"));
        assert_eq!(list.len(), 1);
        assert!(list.contains(&VariantId::new("A")));
    }

    #[test]
    fn test_remove() {
        let list = Wishlist::new()
            .apply(add("A"))
            .apply(add("B"))
            .apply(WishlistAction::Remove {
                variant_id: VariantId::new("A"),
            });

        assert!(!list.contains(&VariantId::new("A")));
        assert_eq!(list.items().first().map(|i| i.variant_id.as_str()), Some("B"));
    }

    #[test]
    fn test_stored_duplicates_collapse() {
        let stored = r#"[
            {"variantId": "A", "title": "Tee"},
            {"variantId": "A", "title": "Tee again"},
            {"variantId": "B", "title": "Cap", "price": {"amount": "5.00", "currencyCode": "USD"}}
        ]"#;
        let list: Wishlist = serde_json::from_str(stored).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.items().first().map(|i| i.title.as_str()), Some("Tee"));
        assert_eq!(
            list.items().get(1).and_then(|i| i.unit_price.clone()),
            Some(Money::new("5.00", "USD"))
        );
    }
}
