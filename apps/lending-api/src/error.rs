//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Lending API                        │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  POST /api/checkout                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<Json<T>, ApiError>                              │  │
//! │  │         │                                                        │  │
//! │  │  Bad JSON body? ─────── JsonRejection ──────────┐                │  │
//! │  │         │                                       │                │  │
//! │  │  Rule rejected? ─────── CoreError ──────────────┼──► ApiError ──►│  │
//! │  │         │                                       │                │  │
//! │  │  Store failed? ──────── StoreError (logged) ────┘                │  │
//! │  │         │                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  400 {"code":"OUT_OF_STOCK","message":"Item Drill (1) is out of stock"} │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lending_core::CoreError;
use lending_store::{ServiceError, StoreError};
use serde::Serialize;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Checkout record not found: 999"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item or checkout not found (404)
    NotFound,

    /// Item has no units on the shelf (400)
    OutOfStock,

    /// Checkout was already closed (400)
    AlreadyReturned,

    /// Input validation failed (422)
    ValidationError,

    /// Persistence failed (500)
    StoreError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::OutOfStock | ErrorCode::AlreadyReturned => StatusCode::BAD_REQUEST,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts inventory rule violations to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ItemNotFound(_)
            | CoreError::CheckoutNotFound(_)
            | CoreError::ItemForCheckoutNotFound { .. } => ErrorCode::NotFound,
            CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CoreError::AlreadyReturned { .. } => ErrorCode::AlreadyReturned,
            CoreError::IdSpaceExhausted { .. } => ErrorCode::StoreError,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        match code {
            ErrorCode::OutOfStock | ErrorCode::AlreadyReturned => {
                tracing::warn!(reason = err.reason(), "{}", err);
            }
            ErrorCode::StoreError => {
                tracing::error!(reason = err.reason(), "{}", err);
            }
            ErrorCode::NotFound | ErrorCode::ValidationError => {}
        }

        ApiError::new(code, err.to_string())
    }
}

/// Converts store errors to API errors.
///
/// The details go to the log; clients get a generic message.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Store operation failed");
        let message = match err {
            StoreError::ConnectionFailed(_) => "Store connection failed",
            StoreError::MigrationFailed(_) => "Store migration failed",
            StoreError::Corrupt { .. } | StoreError::Serialization(_) => {
                "Stored data could not be read"
            }
            StoreError::Io(_) | StoreError::QueryFailed(_) | StoreError::Internal(_) => {
                "Store operation failed"
            }
        };
        ApiError::new(ErrorCode::StoreError, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(err) => err.into(),
            ServiceError::Store(err) => err.into(),
        }
    }
}

/// Malformed or mistyped request bodies are validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use lending_core::ValidationError;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::CheckoutNotFound(999).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Checkout record not found: 999");

        let err: ApiError = CoreError::OutOfStock {
            item_id: 1,
            name: "Drill".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::OutOfStock);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = CoreError::AlreadyReturned {
            checkout_id: 1,
            return_date: None,
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = CoreError::IdSpaceExhausted { last_id: u64::MAX }.into();
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ApiError = CoreError::Validation(ValidationError::Negative {
            field: "quantity".into(),
        })
        .into();
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_store_error_message_is_generic() {
        let err: ApiError = StoreError::QueryFailed("disk I/O error at page 7".into()).into();
        assert_eq!(err.code, ErrorCode::StoreError);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(ApiError::new(ErrorCode::AlreadyReturned, "x")).unwrap();
        assert_eq!(value, serde_json::json!({"code": "ALREADY_RETURNED", "message": "x"}));
    }
}
