//! HTTP middleware: CORS, security headers and error logging.
//!
//! ```ignore
//! use axum_helpers::http::{create_cors_layer, log_errors, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(log_errors))
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(create_cors_layer(origins));
//! ```

pub mod cors;
pub mod error_log;
pub mod security;

pub use cors::{create_cors_layer, parse_allowed_origins};
pub use error_log::log_errors;
pub use security::security_headers;
