//! # Domain Types
//!
//! Core domain types used throughout the lending tracker.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐            ┌──────────────────────┐               │
//! │  │      Item       │            │       Checkout       │               │
//! │  │  ─────────────  │  item_id   │  ──────────────────  │               │
//! │  │  id (u64)       │◄───────────│  id (u64)            │               │
//! │  │  name           │            │  borrower            │               │
//! │  │  category       │            │  checkout_date       │               │
//! │  │  quantity (u32) │            │  due_date?           │               │
//! │  └─────────────────┘            │  returned            │               │
//! │                                 │  return_date?        │               │
//! │                                 └──────────────────────┘               │
//! │                                                                         │
//! │  Requests: NewItem, CheckoutRequest, ReturnRequest                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! - `id`: assigned as `max(id) + 1` over the collection, never changed.
//! - Items also have a merge key: trimmed, lowercased `(name, category)`.
//!
//! Dates are `NaiveDate` and serialize as `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Record
// =============================================================================

/// Anything stored in a collection with a numeric id.
pub trait Record {
    /// The record's id.
    fn id(&self) -> u64;
}

// =============================================================================
// Item
// =============================================================================

/// A stocked, lendable inventory unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: u64,

    /// Display name, stored trimmed.
    pub name: String,

    /// Category, stored trimmed.
    pub category: String,

    /// Units currently on the shelf.
    pub quantity: u32,
}

impl Item {
    /// Returns the case-insensitive merge key of this item.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.name, &self.category)
    }

    /// Checks if at least one unit can be lent.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

impl Record for Item {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Merge key for items: trimmed and lowercased `(name, category)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    name: String,
    category: String,
}

impl ItemKey {
    /// Builds the key from raw (untrimmed, mixed case) values.
    pub fn new(name: &str, category: &str) -> Self {
        ItemKey {
            name: name.trim().to_lowercase(),
            category: category.trim().to_lowercase(),
        }
    }
}

// =============================================================================
// Checkout Status
// =============================================================================

/// Lifecycle of a checkout record.
///
/// ```text
///   checkout()          return_item()
///  ───────────► Open ─────────────────► Returned (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// Unit is with the borrower.
    Open,
    /// Unit is back on the shelf.
    Returned,
}

// =============================================================================
// Checkout
// =============================================================================

/// A record of one unit of an item lent to a borrower.
///
/// The persisted shape is flat (`returned` + `return_date`) so the JSON files
/// stay readable and compatible with hand edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub id: u64,

    /// Item id at the time of checkout. Not kept in sync if the item goes away.
    pub item_id: u64,

    pub borrower: String,

    pub checkout_date: NaiveDate,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Flips to `true` exactly once.
    #[serde(default)]
    pub returned: bool,

    /// Set together with `returned`, never changed afterwards.
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
}

impl Checkout {
    /// Returns the lifecycle state derived from `returned`.
    #[inline]
    pub fn status(&self) -> CheckoutStatus {
        if self.returned {
            CheckoutStatus::Returned
        } else {
            CheckoutStatus::Open
        }
    }

    /// Checks if the unit is still out.
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.returned
    }
}

impl Record for Checkout {
    fn id(&self) -> u64 {
        self.id
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Input for adding stock.
///
/// `quantity` is signed so that a negative value is rejected by validation
/// with a clear message instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub quantity: i64,
}

impl NewItem {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, category: impl Into<String>, quantity: i64) -> Self {
        NewItem {
            name: name.into(),
            category: category.into(),
            quantity,
        }
    }
}

/// Input for lending one unit of an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub item_id: u64,
    pub borrower: String,
    pub checkout_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl CheckoutRequest {
    /// Convenience constructor without a due date.
    pub fn new(item_id: u64, borrower: impl Into<String>, checkout_date: NaiveDate) -> Self {
        CheckoutRequest {
            item_id,
            borrower: borrower.into(),
            checkout_date,
            due_date: None,
        }
    }

    /// Sets the due date.
    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Input for closing a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub checkout_id: u64,
    pub return_date: NaiveDate,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_item_key_ignores_case_and_whitespace() {
        assert_eq!(ItemKey::new("Drill", "Tools"), ItemKey::new(" drill", "TOOLS  "));
        assert_ne!(ItemKey::new("Drill", "Tools"), ItemKey::new("Drill", "Garden"));
    }

    #[test]
    fn test_checkout_status() {
        let mut checkout = Checkout {
            id: 1,
            item_id: 1,
            borrower: "Alice".into(),
            checkout_date: date("2024-01-01"),
            due_date: None,
            returned: false,
            return_date: None,
        };
        assert_eq!(checkout.status(), CheckoutStatus::Open);

        checkout.returned = true;
        assert_eq!(checkout.status(), CheckoutStatus::Returned);
    }

    #[test]
    fn test_checkout_serializes_flat_with_iso_dates() {
        let checkout = Checkout {
            id: 10,
            item_id: 1,
            borrower: "Alice".into(),
            checkout_date: date("2024-01-01"),
            due_date: Some(date("2024-01-15")),
            returned: false,
            return_date: None,
        };

        let value = serde_json::to_value(&checkout).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 10,
                "item_id": 1,
                "borrower": "Alice",
                "checkout_date": "2024-01-01",
                "due_date": "2024-01-15",
                "returned": false,
                "return_date": null
            })
        );
    }

    #[test]
    fn test_checkout_missing_optionals_default() {
        let checkout: Checkout = serde_json::from_value(json!({
            "id": 3,
            "item_id": 2,
            "borrower": "Bob",
            "checkout_date": "2024-02-01"
        }))
        .unwrap();

        assert!(checkout.is_open());
        assert_eq!(checkout.due_date, None);
        assert_eq!(checkout.return_date, None);
    }

    #[test]
    fn test_checkout_request_rejects_bad_date() {
        let result: Result<CheckoutRequest, _> = serde_json::from_value(json!({
            "item_id": 1,
            "borrower": "Bob",
            "checkout_date": "01/02/2024"
        }));
        assert!(result.is_err());
    }
}
