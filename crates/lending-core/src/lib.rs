//! # lending-core: Pure Inventory Rules for the Lending Tracker
//!
//! This crate is the **heart** of the lending tracker. It holds the types and
//! the rules that keep item quantities and checkout records consistent, as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Lending Tracker Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP layer (lending-api)                     │   │
//! │  │    /api/items   /api/checkout   /api/return   /api/checkedout   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          InventoryService + RecordStore (lending-store)         │   │
//! │  │        read collections → lock → mutate → write collections     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ lending-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌────────────┐                │   │
//! │  │   │   types   │  │   ledger   │  │ validation │                │   │
//! │  │   │   Item    │  │  next_id   │  │   rules    │                │   │
//! │  │   │ Checkout  │  │ merge/lend │  │   checks   │                │   │
//! │  │   └───────────┘  └────────────┘  └────────────┘                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Checkout, request payloads)
//! - [`ledger`] - Collection mutations: merge items, lend, return, id assignment
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use lending_core::ledger;
//! use lending_core::NewItem;
//!
//! let mut items = Vec::new();
//! let drill = ledger::add_or_merge_item(&mut items, NewItem::new("Drill", "Tools", 5)).unwrap();
//! let again = ledger::add_or_merge_item(&mut items, NewItem::new("drill", " tools ", 3)).unwrap();
//!
//! assert!(again.merged);
//! assert_eq!(drill.item.id, again.item.id);
//! assert_eq!(again.item.quantity, 8);
//! assert_eq!(items.len(), 1);
//! ```

pub mod error;
pub mod ledger;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use types::*;
