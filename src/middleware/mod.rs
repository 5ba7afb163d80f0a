//! HTTP middleware: authentication extraction, security headers, tracing

pub mod auth;
pub mod security;
pub mod tracing;

pub use auth::AuthenticatedUser;
pub use security::{hsts_header, security_headers};
pub use tracing::request_tracing;
