//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use database::postgres::DatabaseConnection;

/// Routes nested under `/api`
pub fn routes(db: &DatabaseConnection) -> Router {
    Router::new().nest("/products", products::router(db))
}
