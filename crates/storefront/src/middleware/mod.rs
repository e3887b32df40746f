//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Rate limiting (governor, auth routes only)
//!
//! Admin routes are gated per handler by the [`RequireAdminSecret`] extractor.

pub mod admin_secret;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use admin_secret::{ADMIN_SECRET_HEADER, RequireAdminSecret};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
