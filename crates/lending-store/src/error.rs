//! # Store Error Types
//!
//! Error types for persistence and for the inventory service.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io / serde_json / sqlx errors                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError ← StoreError | CoreError (NotFound / Conflict / ...)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in HTTP app) ← Serialized for clients                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lending_core::CoreError;
use thiserror::Error;

/// Persistence failures.
///
/// All of these are treated as fatal for the current request; nothing in
/// the service retries them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a collection file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collection could not be encoded or decoded.
    ///
    /// ## When This Occurs
    /// - A JSON file was edited by hand and is no longer a valid array
    /// - A record is missing a required field
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored data violates the record shape (negative quantity, bad id).
    #[error("Corrupt {collection} record: {reason}")]
    Corrupt { collection: String, reason: String },

    /// Internal error (e.g. a blocking task panicked).
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a Corrupt error.
    pub fn corrupt(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            collection: collection.into(),
            reason: reason.into(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut   → StoreError::ConnectionFailed
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// sqlx::Error::Io             → StoreError::Io
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("Timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::Io(io_err) => StoreError::Io(io_err),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Internal(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by [`crate::InventoryService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An inventory rule rejected the operation. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed while reading or writing.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
