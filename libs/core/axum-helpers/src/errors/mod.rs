pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Product not found with id: 42"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// What went wrong, attached to the extensions of every error response.
///
/// Read back by [`crate::http::log_errors`] so failures are logged once, at
/// the edge, with request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Multipart extraction error: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    /// Failure while reading a multipart body, such as exceeding the body limit
    #[error("Multipart read error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    /// Server-side failure whose message is returned verbatim
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    /// Unclassified failure, reported as "An unexpected error occurred: ..."
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    fn into_parts(self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::JsonExtractorRejection(e) => (e.status(), ErrorCode::InvalidJson, e.body_text()),
            AppError::MultipartRejection(e) => {
                (e.status(), ErrorCode::InvalidMultipart, e.body_text())
            }
            AppError::Multipart(e) => (e.status(), ErrorCode::InvalidMultipart, e.body_text()),
            AppError::InvalidId(msg) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidId, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg),
            AppError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, msg)
            }
            AppError::Unexpected(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::UnexpectedError,
                format!("{}: {}", ErrorCode::UnexpectedError.default_message(), msg),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.into_parts();
        error_response(status, message, code)
    }
}

/// Build an error response by hand, with its [`ErrorReport`] attached.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let report = ErrorReport {
        code: error_code,
        message: message.clone(),
    };

    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    let mut response = (status, body).into_response();
    response.extensions_mut().insert(report);
    response
}
