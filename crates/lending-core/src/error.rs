//! # Error Types
//!
//! Domain-specific error types for lending-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lending-core errors (this file)                                       │
//! │  ├── CoreError        - Lookup failures and state conflicts            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lending-store errors (separate crate)                                 │
//! │  ├── StoreError       - Persistence failures                           │
//! │  └── ServiceError     - CoreError | StoreError                         │
//! │                                                                         │
//! │  HTTP errors (in app)                                                  │
//! │  └── ApiError         - What clients see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError → Client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` belongs to exactly one [`ErrorKind`]; the HTTP layer maps
//! kinds to status codes and never needs to inspect variants for that.

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of domain failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The operation is invalid for the current state.
    Conflict,
    /// Malformed input.
    Validation,
}

// =============================================================================
// Core Error
// =============================================================================

/// Inventory rule violations and failed lookups.
///
/// None of these are retried by the core. When one is returned from a
/// mutating operation, nothing has been written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No item with this id.
    #[error("Item not found: {0}")]
    ItemNotFound(u64),

    /// No checkout record with this id.
    #[error("Checkout record not found: {0}")]
    CheckoutNotFound(u64),

    /// The checkout points at an item that no longer exists.
    ///
    /// ## When This Occurs
    /// Items are never deleted by the core, so this only shows up when the
    /// items collection was edited by hand or restored from an older backup
    /// while checkouts kept referencing the removed id.
    #[error("Item {item_id} for checkout {checkout_id} no longer exists")]
    ItemForCheckoutNotFound { checkout_id: u64, item_id: u64 },

    /// The item has no units left to lend.
    ///
    /// ## User Workflow
    /// ```text
    /// checkout(item 1, "Bob")
    ///      │
    ///      ▼
    /// item 1 quantity = 0
    ///      │
    ///      ▼
    /// OutOfStock { item_id: 1, name: "Drill" }
    ///      │
    ///      ▼
    /// Client shows: "Drill is out of stock"
    /// ```
    #[error("Item {name} ({item_id}) is out of stock")]
    OutOfStock { item_id: u64, name: String },

    /// The checkout was already closed.
    #[error("Checkout {checkout_id} was already returned on {return_date:?}")]
    AlreadyReturned {
        checkout_id: u64,
        return_date: Option<NaiveDate>,
    },

    /// The collection already holds the largest representable id.
    ///
    /// Only reachable when a stored collection was edited by hand.
    #[error("No ids left after {last_id}")]
    IdSpaceExhausted { last_id: u64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ItemNotFound(_)
            | CoreError::CheckoutNotFound(_)
            | CoreError::ItemForCheckoutNotFound { .. } => ErrorKind::NotFound,
            CoreError::OutOfStock { .. }
            | CoreError::AlreadyReturned { .. }
            | CoreError::IdSpaceExhausted { .. } => ErrorKind::Conflict,
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Short machine-readable reason, stable across message wording changes.
    pub fn reason(&self) -> &'static str {
        match self {
            CoreError::ItemNotFound(_) => "item",
            CoreError::CheckoutNotFound(_) => "checkout",
            CoreError::ItemForCheckoutNotFound { .. } => "item_for_checkout",
            CoreError::OutOfStock { .. } => "out_of_stock",
            CoreError::AlreadyReturned { .. } => "already_returned",
            CoreError::IdSpaceExhausted { .. } => "ids_exhausted",
            CoreError::Validation(_) => "validation",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// A request that fails validation never writes to the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value below zero.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value does not fit the stored integer width.
    #[error("{field} is too large (max {max})")]
    Overflow { field: String, max: u64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
