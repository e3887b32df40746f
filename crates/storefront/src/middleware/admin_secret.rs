//! Shared-secret gate for the admin API routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-demo-admin-secret";

/// Extractor that requires a valid `x-demo-admin-secret` header.
///
/// Rejects every request when `DEMO_ADMIN_SECRET` is unset.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(_admin: RequireAdminSecret, State(state): State<AppState>) -> Result<Json<Value>> {
///     // only reached with the right secret
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdminSecret;

impl FromRequestParts<AppState> for RequireAdminSecret {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_secret() else {
            tracing::warn!(path = %parts.uri.path(), "Admin request rejected: DEMO_ADMIN_SECRET not set");
            return Err(unauthorized());
        };

        let provided = parts
            .headers
            .get(ADMIN_SECRET_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();

        if secrets_match(expected.expose_secret().as_bytes(), provided) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Admin request rejected: invalid secret");
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized: Invalid admin secret".to_string())
}

/// Constant-time comparison; only the length can differ in timing.
fn secrets_match(expected: &[u8], provided: &[u8]) -> bool {
    !expected.is_empty() && bool::from(expected.ct_eq(provided))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match(b"s3cr3t-value", b"s3cr3t-value"));
        assert!(!secrets_match(b"s3cr3t-value", b"s3cr3t-valuf"));
        assert!(!secrets_match(b"s3cr3t-value", b"s3cr3t"));
        assert!(!secrets_match(b"s3cr3t-value", b""));
    }

    #[test]
    fn test_empty_expected_never_matches() {
        assert!(!secrets_match(b"", b""));
    }
}
