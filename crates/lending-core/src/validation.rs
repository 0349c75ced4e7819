//! # Validation Module
//!
//! Input validation for the lending tracker.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (axum Json extractor)                                   │
//! │  ├── Type validation (deserialization, YYYY-MM-DD dates)               │
//! │  └── Rejects missing fields / wrong types                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Non-empty after trim                                              │
//! │  └── quantity >= 0 and fits in u32                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: ledger rules                                                 │
//! │  ├── Lookups (NotFound)                                                │
//! │  └── State checks (Conflict)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators return the normalized (trimmed / narrowed) value so callers
//! cannot accidentally store the raw input.
//!
//! ## Usage
//! ```rust
//! use lending_core::validation::{validate_name, validate_quantity};
//!
//! assert_eq!(validate_name("  Drill ").unwrap(), "Drill");
//! assert_eq!(validate_quantity(5).unwrap(), 5u32);
//! assert!(validate_quantity(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{CheckoutRequest, NewItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A `NewItem` that passed validation: trimmed strings, unsigned quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidItem {
    pub name: String,
    pub category: String,
    pub quantity: u32,
}

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and checks it is non-empty. Length is not capped.
pub fn validate_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

/// Validates an item name.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    validate_text("name", name)
}

/// Validates an item category.
pub fn validate_category(category: &str) -> ValidationResult<String> {
    validate_text("category", category)
}

/// Validates a borrower name.
pub fn validate_borrower(borrower: &str) -> ValidationResult<String> {
    validate_text("borrower", borrower)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock quantity.
///
/// ## Rules
/// - Must not be negative (zero is allowed: an item can be registered empty)
/// - Must fit in `u32`
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    u32::try_from(qty).map_err(|_| ValidationError::Overflow {
        field: "quantity".to_string(),
        max: u64::from(u32::MAX),
    })
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates every field of a `NewItem`.
pub fn validate_new_item(item: &NewItem) -> ValidationResult<ValidItem> {
    Ok(ValidItem {
        name: validate_name(&item.name)?,
        category: validate_category(&item.category)?,
        quantity: validate_quantity(item.quantity)?,
    })
}

/// Validates a checkout request and returns the trimmed borrower.
///
/// `due_date` is deliberately not compared against `checkout_date`.
pub fn validate_checkout_request(request: &CheckoutRequest) -> ValidationResult<String> {
    validate_borrower(&request.borrower)
}

// =============================================================================
// Unit Tests
// =============================================================================
