//! Sign and send test webhooks.
//!
//! The signature is computed over the file's exact bytes, so reformatting the
//! JSON after signing invalidates it.

use std::path::Path;

use headless_shop_core::webhook::{
    HMAC_HEADER, SHOP_DOMAIN_HEADER, TOPIC_HEADER, WEBHOOK_ID_HEADER, compute_signature,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use super::{CommandError, read_file, required_env, server_error_message};

/// Default order webhook endpoint.
pub const DEFAULT_WEBHOOK_URL: &str = "http://127.0.0.1:3000/api/webhooks/orders";

fn webhook_secret() -> Result<SecretString, CommandError> {
    required_env("WEBHOOK_SECRET").map(SecretString::from)
}

/// Print the signature for a payload file.
///
/// # Errors
///
/// Returns an error if `WEBHOOK_SECRET` is unset or the file cannot be read.
#[allow(clippy::print_stdout)]
pub async fn sign(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let secret = webhook_secret()?;
    let body = read_file(file).await?;

    println!("{}", compute_signature(&body, secret.expose_secret()));
    Ok(())
}

/// POST a payload file to the webhook endpoint with a valid signature.
///
/// A fresh webhook ID is generated unless one is given, so repeated sends are
/// processed; passing the same ID twice exercises deduplication.
///
/// # Errors
///
/// Returns an error if `WEBHOOK_SECRET` is unset, the file cannot be read, the
/// request fails, or the server answers with a non-2xx status.
pub async fn send(
    file: &Path,
    url: &str,
    topic: &str,
    webhook_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let secret = webhook_secret()?;
    let body = read_file(file).await?;
    let signature = compute_signature(&body, secret.expose_secret());
    let webhook_id = webhook_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let shop = std::env::var("SHOP_DOMAIN").unwrap_or_else(|_| "localhost".to_string());

    info!(%url, %topic, %webhook_id, bytes = body.len(), "Sending webhook");

    let response = reqwest::Client::new()
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(HMAC_HEADER, signature)
        .header(TOPIC_HEADER, topic)
        .header(WEBHOOK_ID_HEADER, &webhook_id)
        .header(SHOP_DOMAIN_HEADER, shop)
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(CommandError::Server {
            status: status.as_u16(),
            message: server_error_message(&text),
        }
        .into());
    }

    info!(status = status.as_u16(), response = %text.trim(), "Webhook accepted");
    Ok(())
}
