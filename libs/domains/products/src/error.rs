use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("Product not found with id: {0}")]
    NotFound(i32),

    #[error("Image not found for product id: {0}")]
    ImageNotFound(i32),

    #[error("Product {0} is out of stock.")]
    InsufficientStock(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to create product: {0}")]
    CreationFailed(String),

    #[error("Failed to update product: {0}")]
    UpdateFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProductError {
    /// Failures outside the catalog's own taxonomy; reported to clients as
    /// unexpected errors.
    pub fn is_unclassified(&self) -> bool {
        matches!(
            self,
            ProductError::Database(_) | ProductError::Image(_) | ProductError::Internal(_)
        )
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        let message = err.to_string();
        if err.is_unclassified() {
            return AppError::Unexpected(message);
        }
        match err {
            ProductError::NotFound(_) | ProductError::ImageNotFound(_) => AppError::NotFound(message),
            ProductError::InsufficientStock(_) | ProductError::InvalidRequest(_) => {
                AppError::BadRequest(message)
            }
            _ => AppError::InternalServerError(message),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

// Only the message survives the conversion, so the full source chain is
// logged here.
impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        error!(error = ?err, "Database operation failed");
        ProductError::Database(err.to_string())
    }
}

impl From<std::io::Error> for ProductError {
    fn from(err: std::io::Error) -> Self {
        error!(error = ?err, kind = ?err.kind(), "Image processing failed");
        ProductError::Image(err.to_string())
    }
}
