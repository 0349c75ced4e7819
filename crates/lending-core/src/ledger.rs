//! # Ledger
//!
//! The inventory rules, applied to in-memory collections.
//!
//! Every function here takes the collections by `&mut` and either mutates them
//! and returns `Ok`, or returns `Err` with the collections untouched. The store
//! layer relies on that to skip the write on any error.
//!
//! ## Stock Accounting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For every item at every point in time:                                │
//! │                                                                         │
//! │     units added  ==  item.quantity  +  open checkouts of that item      │
//! │                                                                         │
//! │  add_or_merge_item   quantity += n                                      │
//! │  lend                quantity -= 1, push Open checkout                  │
//! │  return_checkout     quantity += 1, Open → Returned                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Checkout, CheckoutRequest, Item, ItemKey, NewItem, Record, ReturnRequest};
use crate::validation::{validate_checkout_request, validate_new_item};

// =============================================================================
// Id Assignment
// =============================================================================

/// Computes the id for the next record: `max(id) + 1`, or `1` when empty.
///
/// Pure function of the snapshot passed in. Callers must pass the collection
/// they just read, under the same lock as the write that follows.
///
/// ## Errors
/// - `IdSpaceExhausted` - the snapshot already holds id `u64::MAX`
///
/// ## Example
/// ```rust
/// use lending_core::ledger::next_id;
/// use lending_core::Item;
///
/// let items: Vec<Item> = Vec::new();
/// assert_eq!(next_id(&items).unwrap(), 1);
/// ```
pub fn next_id<R: Record>(records: &[R]) -> CoreResult<u64> {
    let last_id = records.iter().map(Record::id).max().unwrap_or(0);
    last_id
        .checked_add(1)
        .ok_or(CoreError::IdSpaceExhausted { last_id })
}

// =============================================================================
// Items
// =============================================================================

/// Result of [`add_or_merge_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stocked {
    /// The item as it now stands in the collection.
    pub item: Item,
    /// `true` if the units were added to an existing item.
    pub merged: bool,
}

/// Adds stock, merging into an existing item with the same key.
///
/// ## Flow
/// ```text
/// NewItem { " drill ", "TOOLS", 3 }
///      │
///      ▼
/// validate (trim, non-empty, quantity >= 0)
///      │
///      ▼
/// key = ("drill", "tools") ──── match? ──► existing.quantity += 3
///      │                                   (merged = true)
///      │ no match
///      ▼
/// push Item { id: next_id, "drill", "TOOLS", 3 }
/// ```
///
/// The stored name and category keep the casing of the first insert.
pub fn add_or_merge_item(items: &mut Vec<Item>, new_item: NewItem) -> CoreResult<Stocked> {
    let valid = validate_new_item(&new_item)?;
    let key = ItemKey::new(&valid.name, &valid.category);

    if let Some(existing) = items.iter_mut().find(|item| item.key() == key) {
        existing.quantity =
            existing
                .quantity
                .checked_add(valid.quantity)
                .ok_or_else(|| ValidationError::Overflow {
                    field: "quantity".to_string(),
                    max: u64::from(u32::MAX),
                })?;

        return Ok(Stocked {
            item: existing.clone(),
            merged: true,
        });
    }

    let item = Item {
        id: next_id(items)?,
        name: valid.name,
        category: valid.category,
        quantity: valid.quantity,
    };
    items.push(item.clone());

    Ok(Stocked {
        item,
        merged: false,
    })
}

// =============================================================================
// Checkouts
// =============================================================================

/// Lends one unit of an item and records the checkout.
///
/// ## Errors
/// - `Validation` - blank borrower
/// - `ItemNotFound` - no item with `request.item_id`
/// - `OutOfStock` - item quantity is zero
pub fn lend(
    items: &mut [Item],
    checkouts: &mut Vec<Checkout>,
    request: CheckoutRequest,
) -> CoreResult<Checkout> {
    let borrower = validate_checkout_request(&request)?;
    let id = next_id(checkouts)?;

    let item = items
        .iter_mut()
        .find(|item| item.id == request.item_id)
        .ok_or(CoreError::ItemNotFound(request.item_id))?;

    if !item.in_stock() {
        return Err(CoreError::OutOfStock {
            item_id: item.id,
            name: item.name.clone(),
        });
    }

    item.quantity -= 1;

    let checkout = Checkout {
        id,
        item_id: request.item_id,
        borrower,
        checkout_date: request.checkout_date,
        due_date: request.due_date,
        returned: false,
        return_date: None,
    };
    checkouts.push(checkout.clone());

    Ok(checkout)
}

/// Closes an open checkout and puts the unit back on the shelf.
///
/// ## Errors
/// - `CheckoutNotFound` - no checkout with `request.checkout_id`
/// - `AlreadyReturned` - the checkout is already closed
/// - `ItemForCheckoutNotFound` - the checkout's item is gone
pub fn return_checkout(
    items: &mut [Item],
    checkouts: &mut [Checkout],
    request: ReturnRequest,
) -> CoreResult<Checkout> {
    let checkout = checkouts
        .iter_mut()
        .find(|checkout| checkout.id == request.checkout_id)
        .ok_or(CoreError::CheckoutNotFound(request.checkout_id))?;

    if checkout.returned {
        return Err(CoreError::AlreadyReturned {
            checkout_id: checkout.id,
            return_date: checkout.return_date,
        });
    }

    let item = items
        .iter_mut()
        .find(|item| item.id == checkout.item_id)
        .ok_or(CoreError::ItemForCheckoutNotFound {
            checkout_id: checkout.id,
            item_id: checkout.item_id,
        })?;

    let restocked = item
        .quantity
        .checked_add(1)
        .ok_or_else(|| ValidationError::Overflow {
            field: "quantity".to_string(),
            max: u64::from(u32::MAX),
        })?;

    item.quantity = restocked;
    checkout.returned = true;
    checkout.return_date = Some(request.return_date);

    Ok(checkout.clone())
}

/// Keeps only open checkouts, preserving order.
pub fn open_checkouts(checkouts: Vec<Checkout>) -> Vec<Checkout> {
    checkouts
        .into_iter()
        .filter(Checkout::is_open)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
