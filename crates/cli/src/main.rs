//! Headless Shop CLI - Operator tools and a local cart client.
//!
//! # Usage
//!
//! ```bash
//! # Sign a webhook payload, or send it signed to a running server
//! hs-cli webhook sign order.json
//! hs-cli webhook send order.json --url http://127.0.0.1:3000/api/webhooks/orders
//!
//! # Check that the Storefront API token works
//! hs-cli token-check
//!
//! # Seed demo products through the admin API
//! hs-cli seed products.json --server http://127.0.0.1:3000
//!
//! # Local cart and wishlist
//! hs-cli cart add gid://shopify/ProductVariant/1 --title "Pineapple Tee" --price 25.00
//! hs-cli cart set gid://shopify/ProductVariant/1 3
//! hs-cli cart checkout --validate
//! hs-cli wishlist add gid://shopify/ProductVariant/2 --title "Sticker"
//! ```
//!
//! # Commands
//!
//! - `webhook` - Sign and send test webhooks
//! - `token-check` - Query `{ shop { name } }` with the Storefront token
//! - `seed` - Create demo products
//! - `cart` / `wishlist` - Client state persisted under `--store`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hs-cli")]
#[command(author, version, about = "Headless Shop CLI tools")]
struct Cli {
    /// Directory holding the local cart and wishlist
    #[arg(long, global = true, env = "SHOP_STATE_DIR", default_value = ".shop-state")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign and send test webhooks
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
    /// Verify the Storefront API token by fetching the shop name
    TokenCheck,
    /// Create demo products from a JSON array via the admin API
    Seed {
        /// JSON file containing an array of Admin API product objects
        file: PathBuf,

        /// Storefront server base URL
        #[arg(long, env = "STOREFRONT_URL", default_value = commands::DEFAULT_SERVER)]
        server: String,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartCommand,
    },
    /// Manage the local wishlist
    Wishlist {
        #[command(subcommand)]
        action: commands::wishlist::WishlistCommand,
    },
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Print the base64 HMAC-SHA256 of a file under `WEBHOOK_SECRET`
    Sign {
        /// Payload file, signed byte for byte
        file: PathBuf,
    },
    /// POST a file to the webhook endpoint with a valid signature
    Send {
        /// Payload file
        file: PathBuf,

        /// Webhook endpoint URL
        #[arg(long, default_value = commands::webhook::DEFAULT_WEBHOOK_URL)]
        url: String,

        /// Value of the `X-Shopify-Topic` header
        #[arg(long, default_value = "orders/create")]
        topic: String,

        /// Reuse a webhook ID instead of generating one (to test deduplication)
        #[arg(long)]
        webhook_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    // Load .env so secrets need not be passed on the command line
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Webhook { action } => match action {
            WebhookAction::Sign { file } => commands::webhook::sign(&file).await?,
            WebhookAction::Send {
                file,
                url,
                topic,
                webhook_id,
            } => commands::webhook::send(&file, &url, &topic, webhook_id).await?,
        },
        Commands::TokenCheck => commands::token::check().await?,
        Commands::Seed { file, server } => commands::seed::products(&file, &server).await?,
        Commands::Cart { action } => commands::cart::run(&cli.store, action).await?,
        Commands::Wishlist { action } => commands::wishlist::run(&cli.store, action)?,
    }
    Ok(())
}
