//! Seed demo products through the storefront's admin API.
//!
//! Reads a JSON array of Admin API product objects and posts each one to
//! `/api/admin/create-product`, authenticated with `DEMO_ADMIN_SECRET`.

use std::path::Path;

use headless_shop_storefront::middleware::ADMIN_SECRET_HEADER;
use serde_json::{Value, json};
use tracing::{error, info};

use super::{CommandError, read_file, required_env, server_error_message};

/// Parse the seed file into product objects.
///
/// Accepts either a bare array or `{"products": [...]}`.
fn parse_products(raw: &[u8]) -> Result<Vec<Value>, CommandError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| CommandError::Invalid(format!("Seed file is not valid JSON: {e}")))?;

    let products = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CommandError::Invalid(
                    "Seed file must be an array or contain a \"products\" array".to_string(),
                ));
            }
        },
        _ => {
            return Err(CommandError::Invalid(
                "Seed file must be an array of products".to_string(),
            ));
        }
    };

    if let Some(position) = products.iter().position(|p| !p.is_object()) {
        return Err(CommandError::Invalid(format!(
            "Product at index {position} is not an object"
        )));
    }

    Ok(products)
}

/// Create every product in `file`.
///
/// All products are attempted; the command fails if any one fails.
///
/// # Errors
///
/// Returns an error if `DEMO_ADMIN_SECRET` is unset, the file is unreadable
/// or malformed, or any product is rejected.
pub async fn products(file: &Path, server: &str) -> Result<(), Box<dyn std::error::Error>> {
    let secret = required_env("DEMO_ADMIN_SECRET")?;
    let raw = read_file(file).await?;
    let products = parse_products(&raw)?;

    info!(path = %file.display(), count = products.len(), "Loaded seed products");

    let url = format!("{}/api/admin/create-product", server.trim_end_matches('/'));
    let client = reqwest::Client::new();
    let mut failed = 0usize;

    for (index, product) in products.into_iter().enumerate() {
        let title = product
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("(untitled)")
            .to_owned();

        let response = client
            .post(&url)
            .header(ADMIN_SECRET_HEADER, &secret)
            .json(&json!({ "product": product }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let id = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.pointer("/product/id").cloned())
                .unwrap_or(Value::Null);
            info!(index, %title, %id, "Created product");
        } else {
            failed += 1;
            error!(
                index,
                %title,
                status = status.as_u16(),
                error = %server_error_message(&text),
                "Failed to create product"
            );
        }
    }

    if failed > 0 {
        return Err(format!("{failed} product(s) failed to seed").into());
    }

    info!("Seeding complete");
    Ok(())
}
