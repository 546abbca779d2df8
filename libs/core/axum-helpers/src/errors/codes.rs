//! Error codes carried by every [`ErrorResponse`](super::ErrorResponse).
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::NotFound;
//! assert_eq!(code.as_str(), "NOT_FOUND");
//! assert_eq!(code.code(), 1004);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Client errors live in 1000-1999, server errors in 5000-5999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request was well-formed but its content was rejected
    InvalidRequest,

    /// Path identifier is not a valid id
    InvalidId,

    /// JSON body could not be extracted
    InvalidJson,

    NotFound,

    /// Multipart body could not be read
    InvalidMultipart,

    /// Known server-side failure with a message fit for clients
    InternalError,

    /// Anything the domain did not classify
    UnexpectedError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidMultipart => "INVALID_MULTIPART",
            Self::InternalError => "INTERNAL_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }

    /// Integer code for logs and dashboards
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidRequest => 1001,
            Self::InvalidId => 1002,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::InvalidMultipart => 1005,
            Self::InternalError => 5001,
            Self::UnexpectedError => 5002,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::InvalidId => "Invalid id",
            Self::InvalidJson => "Failed to parse request body",
            Self::NotFound => "The requested resource was not found",
            Self::InvalidMultipart => "Failed to read multipart body",
            Self::InternalError => "An internal server error occurred",
            Self::UnexpectedError => "An unexpected error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_and_server_ranges() {
        for code in [
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidId,
            ErrorCode::InvalidJson,
            ErrorCode::NotFound,
            ErrorCode::InvalidMultipart,
        ] {
            assert!((1000..2000).contains(&code.code()), "{code}");
        }
        for code in [ErrorCode::InternalError, ErrorCode::UnexpectedError] {
            assert!((5000..6000).contains(&code.code()), "{code}");
        }
    }

    #[test]
    fn test_serialized_form_matches_as_str() {
        let json = serde_json::to_string(&ErrorCode::UnexpectedError).unwrap();
        assert_eq!(json, "\"UNEXPECTED_ERROR\"");
        assert_eq!(ErrorCode::UnexpectedError.to_string(), "UNEXPECTED_ERROR");
    }
}
