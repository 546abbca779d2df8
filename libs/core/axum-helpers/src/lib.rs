//! # Axum Helpers
//!
//! Shared plumbing for the catalog's Axum services.
//!
//! - **[`errors`]**: [`AppError`], the standard [`ErrorResponse`] body and error codes
//! - **[`http`]**: error logging, security headers, CORS
//! - **[`extractors`]**: [`IdPath`]
//! - **[`server`]**: router assembly with OpenAPI UIs, health checks, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorReport, ErrorResponse};
pub use extractors::IdPath;
pub use http::{create_cors_layer, log_errors, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres, create_production_app,
    create_router, health_router, run_health_checks,
};
