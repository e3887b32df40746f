//! CLI command implementations.

pub mod cart;
pub mod seed;
pub mod token;
pub mod webhook;
pub mod wishlist;

use thiserror::Error;

/// Default storefront server for commands that talk to the HTTP API.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

/// Errors shared by the commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Invalid(String),
}

/// Read a required, non-empty environment variable.
pub(crate) fn required_env(name: &'static str) -> Result<String, CommandError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CommandError::MissingEnvVar(name))
}

/// Read a file, naming it in the error.
pub(crate) async fn read_file(path: &std::path::Path) -> Result<Vec<u8>, CommandError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| CommandError::ReadFile {
            path: path.display().to_string(),
            source,
        })
}

/// Pull the `error` field out of a JSON error body, or fall back to the raw text.
pub(crate) fn server_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_message_prefers_error_field() {
        assert_eq!(
            server_error_message(r#"{"error":"Unauthorized: Invalid admin secret"}"#),
            "Unauthorized: Invalid admin secret"
        );
        assert_eq!(server_error_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
