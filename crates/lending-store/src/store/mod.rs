//! # Record Stores
//!
//! Whole-collection persistence for items and checkouts.
//!
//! ## Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Whole-Collection Store                               │
//! │                                                                         │
//! │  There is no per-record API. Every mutation is:                         │
//! │                                                                         │
//! │     read_items() ─┐                                                     │
//! │                   ├──► mutate local Vec (lending_core::ledger)          │
//! │ read_checkouts() ─┘          │                                          │
//! │                              ▼                                          │
//! │             write_items() / write_all(items, checkouts)                 │
//! │                                                                         │
//! │  Implementations:                                                       │
//! │  • JsonFileStore  - items.json / checkouts.json, write + rename         │
//! │  • SqliteStore    - two tables, write_all in one transaction            │
//! │  • MemoryStore    - Vec behind RwLock (tests)                           │
//! │                                                                         │
//! │  Concurrency control is NOT the store's job: InventoryService holds     │
//! │  one lock across the whole read → mutate → write span.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - Reads of a never-written collection initialize it to empty and return `[]`.
//! - A single-collection write either fully replaces the collection or leaves
//!   the previous one readable.
//! - Reads return collections in insertion order.

pub mod json;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use lending_core::{Checkout, Item};

use crate::error::StoreResult;

pub use lending_core::ledger::next_id;

/// Durable storage for the two lending collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Returns every item in insertion order.
    async fn read_items(&self) -> StoreResult<Vec<Item>>;

    /// Returns every checkout (open and returned) in insertion order.
    async fn read_checkouts(&self) -> StoreResult<Vec<Checkout>>;

    /// Replaces the items collection.
    async fn write_items(&self, items: &[Item]) -> StoreResult<()>;

    /// Replaces the checkouts collection.
    async fn write_checkouts(&self, checkouts: &[Checkout]) -> StoreResult<()>;

    /// Replaces both collections.
    ///
    /// The default writes items, then checkouts. If the second write fails the
    /// collections disagree; backends override this to close or narrow that
    /// window.
    async fn write_all(&self, items: &[Item], checkouts: &[Checkout]) -> StoreResult<()> {
        self.write_items(items).await?;
        self.write_checkouts(checkouts).await
    }
}

/// Shared handles delegate to the inner store, so a service can be built over
/// `Arc<dyn RecordStore>` when the backend is picked at runtime.
#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    async fn read_items(&self) -> StoreResult<Vec<Item>> {
        (**self).read_items().await
    }

    async fn read_checkouts(&self) -> StoreResult<Vec<Checkout>> {
        (**self).read_checkouts().await
    }

    async fn write_items(&self, items: &[Item]) -> StoreResult<()> {
        (**self).write_items(items).await
    }

    async fn write_checkouts(&self, checkouts: &[Checkout]) -> StoreResult<()> {
        (**self).write_checkouts(checkouts).await
    }

    async fn write_all(&self, items: &[Item], checkouts: &[Checkout]) -> StoreResult<()> {
        (**self).write_all(items, checkouts).await
    }
}

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::{SqliteConfig, SqliteStore};
