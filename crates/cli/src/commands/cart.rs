//! Local cart backed by a file store.

use std::fmt::Write as _;
use std::path::Path;

use clap::Subcommand;
use headless_shop_core::cart::{Cart, CartAction, CartLineItem, CheckoutLine};
use headless_shop_core::storage::{CART_STORAGE_KEY, FileStore, PersistedState};
use headless_shop_core::{Money, VariantId};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{CommandError, DEFAULT_SERVER, server_error_message};

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Add one unit of a variant
    Add {
        /// Variant GID (e.g. gid://shopify/ProductVariant/1)
        variant_id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Unit price as a decimal string (e.g. 25.00)
        #[arg(long)]
        price: String,

        /// ISO 4217 currency code
        #[arg(long, default_value = "USD")]
        currency: String,

        /// Variant title (e.g. "Large / Blue")
        #[arg(long, default_value = "")]
        variant_title: String,

        /// Product image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Set a line's quantity; zero or below removes it
    Set {
        variant_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { variant_id: String },
    /// Empty the cart
    Clear,
    /// Print the cart and its total
    Show,
    /// Hand the cart to the storefront server for checkout
    Checkout {
        /// Storefront server base URL
        #[arg(long, env = "STOREFRONT_URL", default_value = DEFAULT_SERVER)]
        server: String,

        /// Check availability before creating the checkout
        #[arg(long)]
        validate: bool,
    },
}

/// Execute a cart command against the store in `dir`.
///
/// # Errors
///
/// Returns an error if the input is invalid, the store cannot be written, or
/// checkout fails.
#[allow(clippy::print_stdout)]
pub async fn run(dir: &Path, command: CartCommand) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart: PersistedState<Cart, FileStore> =
        PersistedState::load(FileStore::new(dir), CART_STORAGE_KEY);

    let action = match command {
        CartCommand::Show => {
            print!("{}", render(cart.state()));
            return Ok(());
        }
        CartCommand::Checkout { server, validate } => {
            let url = checkout(cart.state(), &server, validate).await?;
            println!("{url}");
            return Ok(());
        }
        CartCommand::Add {
            variant_id,
            title,
            price,
            currency,
            variant_title,
            image_url,
        } => add_action(variant_id, title, variant_title, Money::new(price, currency), image_url)?,
        CartCommand::Set {
            variant_id,
            quantity,
        } => CartAction::SetQuantity {
            variant_id: VariantId::new(variant_id),
            quantity,
        },
        CartCommand::Remove { variant_id } => CartAction::RemoveItem {
            variant_id: VariantId::new(variant_id),
        },
        CartCommand::Clear => CartAction::Clear,
    };

    let next = cart.dispatch(action)?;
    info!(lines = next.items().len(), items = next.item_count(), "Cart updated");
    print!("{}", render(next));
    Ok(())
}

fn add_action(
    variant_id: String,
    title: String,
    variant_title: String,
    unit_price: Money,
    image_url: Option<String>,
) -> Result<CartAction, CommandError> {
    if variant_id.trim().is_empty() {
        return Err(CommandError::Invalid("Variant ID must not be empty".to_string()));
    }
    unit_price
        .to_price()
        .map_err(|e| CommandError::Invalid(e.to_string()))?;

    let mut item = CartLineItem::new(variant_id, title, variant_title, unit_price);
    if let Some(url) = image_url {
        item = item.with_image_url(url);
    }
    Ok(CartAction::AddItem { item })
}

/// Human-readable cart listing.
fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let name = if item.variant_title.is_empty() {
            item.title.clone()
        } else {
            format!("{} - {}", item.title, item.variant_title)
        };
        let line = item
            .line_total()
            .map_or_else(|_| "invalid price".to_string(), |p| p.display());
        let _ = writeln!(out, "{} x {name} ({}) {line}", item.quantity, item.variant_id);
    }

    let _ = writeln!(out, "Items: {}", cart.item_count());
    match cart.total() {
        Ok(total) => {
            let _ = writeln!(out, "Total: {}", total.display());
        }
        Err(e) => {
            let _ = writeln!(out, "Total unavailable: {e}");
        }
    }
    if cart.has_mixed_currencies() {
        let _ = writeln!(out, "Warning: cart mixes currencies; total is not converted");
    }
    out
}

/// Request a checkout URL for the cart.
async fn checkout(cart: &Cart, server: &str, validate: bool) -> Result<String, CommandError> {
    if cart.is_empty() {
        return Err(CommandError::Invalid("Cart is empty".to_string()));
    }

    let path = if validate {
        "/api/validate-and-create-checkout"
    } else {
        "/api/create-checkout"
    };
    let url = format!("{}{path}", server.trim_end_matches('/'));
    let lines: Vec<CheckoutLine> = cart.checkout_lines();

    info!(%url, lines = lines.len(), "Creating checkout");

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({ "lines": lines }))
        .send()
        .await
        .map_err(|e| CommandError::Invalid(format!("Request to {url} failed: {e}")))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| CommandError::Invalid(format!("Failed to read response: {e}")))?;

    if !status.is_success() {
        if let Some(available) = available_quantity(&text) {
            warn!(available, "Requested quantity exceeds stock");
        }
        return Err(CommandError::Server {
            status: status.as_u16(),
            message: server_error_message(&text),
        });
    }

    checkout_url(&text)
        .ok_or_else(|| CommandError::Invalid("Response did not include a checkout URL".to_string()))
}

fn checkout_url(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("checkoutUrl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}

fn available_quantity(body: &str) -> Option<i64> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("available")
        .and_then(Value::as_i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tee() -> CartAction {
        add_action(
            "gid://shopify/ProductVariant/1".to_string(),
            "Pineapple Tee".to_string(),
            "Medium".to_string(),
            Money::new("25.00", "USD"),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_add_rejects_malformed_price() {
        let err = add_action(
            "gid://shopify/ProductVariant/1".to_string(),
            "Tee".to_string(),
            String::new(),
            Money::new("free", "USD"),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("free"));
    }

    #[test]
    fn test_render_lists_lines_and_total() {
        let cart = Cart::new().apply(tee()).apply(tee());
        let text = render(&cart);

        assert!(text.contains("2 x Pineapple Tee - Medium"));
        assert!(text.contains("Items: 2"));
        assert!(text.contains("Total: 50.00 USD"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render(&Cart::new()), "Cart is empty\n");
    }

    #[test]
    fn test_render_flags_mixed_currencies() {
        let cad = CartAction::AddItem {
            item: CartLineItem::new("gid://shopify/ProductVariant/2", "Mug", "", Money::new("10", "CAD")),
        };
        let text = render(&Cart::new().apply(tee()).apply(cad));
        assert!(text.contains("Total: 35.00 USD"));
        assert!(text.contains("Warning: cart mixes currencies"));
    }

    #[test]
    fn test_cart_persists_between_loads() {
        let dir = tempfile::tempdir().unwrap();

        let mut cart: PersistedState<Cart, FileStore> =
            PersistedState::load(FileStore::new(dir.path()), CART_STORAGE_KEY);
        cart.dispatch(tee()).unwrap();
        cart.dispatch(CartAction::SetQuantity {
            variant_id: VariantId::new("gid://shopify/ProductVariant/1"),
            quantity: 4,
        })
        .unwrap();

        let reloaded: PersistedState<Cart, FileStore> =
            PersistedState::load(FileStore::new(dir.path()), CART_STORAGE_KEY);
        assert_eq!(reloaded.state().item_count(), 4);
    }

    #[test]
    fn test_checkout_response_parsing() {
        assert_eq!(
            checkout_url(r#"{"ok":true,"checkoutUrl":"https://shop.example/c/1","checkoutId":"gid://shopify/Cart/1"}"#),
            Some("https://shop.example/c/1".to_string())
        );
        assert_eq!(checkout_url(r#"{"checkoutUrl":""}"#), None);
        assert_eq!(
            available_quantity(r#"{"ok":false,"error":"Only 2 available for Tee","available":2}"#),
            Some(2)
        );
    }
}
