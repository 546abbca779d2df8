//! Products API routes

use axum::Router;
use database::postgres::DatabaseConnection;
use domain_products::{handlers, PgProductRepository, ProductService};

/// Create products router
pub fn router(db: &DatabaseConnection) -> Router {
    let repository = PgProductRepository::new(db.clone());
    let service = ProductService::new(repository);
    handlers::router(service)
}
