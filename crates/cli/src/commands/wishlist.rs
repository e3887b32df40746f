//! Local wishlist backed by a file store.

use std::fmt::Write as _;
use std::path::Path;

use clap::Subcommand;
use headless_shop_core::storage::{FileStore, PersistedState, WISHLIST_STORAGE_KEY};
use headless_shop_core::wishlist::{Wishlist, WishlistAction, WishlistItem};
use headless_shop_core::{Money, VariantId};

use super::CommandError;

#[derive(Debug, Subcommand)]
pub enum WishlistCommand {
    /// Save a variant
    Add {
        variant_id: String,
        #[arg(long)]
        title: String,
        /// Product handle
        #[arg(long)]
        handle: Option<String>,
        /// Price when saved
        #[arg(long)]
        price: Option<String>,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Forget a variant
    Remove { variant_id: String },
    /// List saved items
    Show,
}

/// Execute a wishlist command against the store in `dir`.
///
/// # Errors
///
/// Returns an error if the input is invalid or the store cannot be written.
#[allow(clippy::print_stdout)]
pub fn run(dir: &Path, command: WishlistCommand) -> Result<(), Box<dyn std::error::Error>> {
    let mut wishlist: PersistedState<Wishlist, FileStore> =
        PersistedState::load(FileStore::new(dir), WISHLIST_STORAGE_KEY);

    let action = match command {
        WishlistCommand::Show => {
            print!("{}", render(wishlist.state()));
            return Ok(());
        }
        WishlistCommand::Add {
            variant_id,
            title,
            handle,
            price,
            currency,
        } => {
            let mut item = WishlistItem::new(variant_id, title);
            item.handle = handle;
            if let Some(amount) = price {
                let money = Money::new(amount, currency);
                money
                    .to_price()
                    .map_err(|e| CommandError::Invalid(e.to_string()))?;
                item.unit_price = Some(money);
            }
            WishlistAction::Add { item }
        }
        WishlistCommand::Remove { variant_id } => WishlistAction::Remove {
            variant_id: VariantId::new(variant_id),
        },
    };

    let next = wishlist.dispatch(action)?;
    tracing::info!(saved = next.len(), "Wishlist updated");
    print!("{}", render(next));
    Ok(())
}

fn render(wishlist: &Wishlist) -> String {
    if wishlist.is_empty() {
        return "Wishlist is empty\n".to_string();
    }

    let mut out = String::new();
    for item in wishlist.items() {
        let price = item
            .unit_price
            .as_ref()
            .and_then(|m| m.to_price().ok())
            .map(|p| format!(" {}", p.display()))
            .unwrap_or_default();
        let _ = writeln!(out, "{} ({}){price}", item.title, item.variant_id);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wishlist() {
        let mut saved = WishlistItem::new("gid://shopify/ProductVariant/7", "Sticker");
        saved.unit_price = Some(Money::new("3", "USD"));
        let list = Wishlist::new()
            .apply(WishlistAction::Add { item: saved })
            .apply(WishlistAction::Add {
                item: WishlistItem::new("gid://shopify/ProductVariant/8", "Poster"),
            });

        assert_eq!(
            render(&list),
            "Sticker (gid://shopify/ProductVariant/7) 3.00 USD\nPoster (gid://shopify/ProductVariant/8)\n"
        );
        assert_eq!(render(&Wishlist::new()), "Wishlist is empty\n");
    }

    #[test]
    fn test_wishlist_add_and_remove_persist() {
        let dir = tempfile::tempdir().unwrap();

        run(
            dir.path(),
            WishlistCommand::Add {
                variant_id: "gid://shopify/ProductVariant/7".to_string(),
                title: "Sticker".to_string(),
                handle: Some("sticker".to_string()),
                price: None,
                currency: "USD".to_string(),
            },
        )
        .unwrap();

        let loaded: PersistedState<Wishlist, FileStore> =
            PersistedState::load(FileStore::new(dir.path()), WISHLIST_STORAGE_KEY);
        assert!(loaded
            .state()
            .contains(&VariantId::new("gid://shopify/ProductVariant/7")));

        run(
            dir.path(),
            WishlistCommand::Remove {
                variant_id: "gid://shopify/ProductVariant/7".to_string(),
            },
        )
        .unwrap();

        let loaded: PersistedState<Wishlist, FileStore> =
            PersistedState::load(FileStore::new(dir.path()), WISHLIST_STORAGE_KEY);
        assert!(loaded.state().is_empty());
    }

    #[test]
    fn test_wishlist_rejects_malformed_price() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            dir.path(),
            WishlistCommand::Add {
                variant_id: "gid://shopify/ProductVariant/7".to_string(),
                title: "Sticker".to_string(),
                handle: None,
                price: Some("cheap".to_string()),
                currency: "USD".to_string(),
            },
        );
        assert!(result.is_err());
    }
}
