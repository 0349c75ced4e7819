//! In-memory record store.
//!
//! Used by tests and by the API test harness. Writes are counted so tests can
//! assert that a rejected operation never touched the store, and the next
//! checkouts write can be made to fail to exercise cross-collection writes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use lending_core::{Checkout, Item};
use tokio::sync::RwLock;

use super::RecordStore;
use crate::error::{StoreError, StoreResult};

/// Record store that keeps both collections in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<Vec<Item>>,
    checkouts: RwLock<Vec<Checkout>>,
    writes: AtomicUsize,
    fail_checkouts_write: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with items.
    pub fn with_items(items: Vec<Item>) -> Self {
        MemoryStore {
            items: RwLock::new(items),
            ..Self::default()
        }
    }

    /// Creates a store pre-filled with both collections.
    pub fn with_records(items: Vec<Item>, checkouts: Vec<Checkout>) -> Self {
        MemoryStore {
            items: RwLock::new(items),
            checkouts: RwLock::new(checkouts),
            ..Self::default()
        }
    }

    /// Number of collection writes that succeeded so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes the next checkouts write fail with an I/O error.
    pub fn fail_next_checkouts_write(&self) {
        self.fail_checkouts_write.store(true, Ordering::SeqCst);
    }

    fn take_checkouts_failure(&self) -> StoreResult<()> {
        if self.fail_checkouts_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other(
                "injected checkouts write failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn read_items(&self) -> StoreResult<Vec<Item>> {
        Ok(self.items.read().await.clone())
    }

    async fn read_checkouts(&self) -> StoreResult<Vec<Checkout>> {
        Ok(self.checkouts.read().await.clone())
    }

    async fn write_items(&self, items: &[Item]) -> StoreResult<()> {
        *self.items.write().await = items.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn write_checkouts(&self, checkouts: &[Checkout]) -> StoreResult<()> {
        self.take_checkouts_failure()?;
        *self.checkouts.write().await = checkouts.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn write_all(&self, items: &[Item], checkouts: &[Checkout]) -> StoreResult<()> {
        // Both locks in a fixed order; the swap is all-or-nothing.
        let mut items_guard = self.items.write().await;
        let mut checkouts_guard = self.checkouts.write().await;

        self.take_checkouts_failure()?;

        *items_guard = items.to_vec();
        *checkouts_guard = checkouts.to_vec();
        self.writes.fetch_add(2, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> Item {
        Item {
            id,
            name: format!("Item {id}"),
            category: "Tools".into(),
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let store = MemoryStore::new();
        assert!(store.read_items().await.unwrap().is_empty());
        assert!(store.read_checkouts().await.unwrap().is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_write_replaces_and_counts() {
        let store = MemoryStore::with_items(vec![item(1)]);
        store.write_items(&[item(2), item(3)]).await.unwrap();

        let ids: Vec<u64> = store.read_items().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_both_collections() {
        let store = MemoryStore::with_items(vec![item(1)]);
        store.fail_next_checkouts_write();

        let err = store.write_all(&[item(9)], &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.read_items().await.unwrap(), vec![item(1)]);
        assert_eq!(store.writes(), 0);

        // One-shot: the next write goes through.
        store.write_all(&[item(9)], &[]).await.unwrap();
        assert_eq!(store.read_items().await.unwrap(), vec![item(9)]);
    }
}
