//! # Inventory Service
//!
//! The five lending operations on top of any [`RecordStore`].
//!
//! ## Mutation Span
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(request)                                                      │
//! │                                                                         │
//! │  ┌──────────── mutation lock held ────────────────────────────────┐     │
//! │  │  read_items()      read_checkouts()                            │     │
//! │  │        │                  │                                    │     │
//! │  │        └───────┬──────────┘                                    │     │
//! │  │                ▼                                               │     │
//! │  │  ledger::lend(&mut items, &mut checkouts, request)             │     │
//! │  │                │                                               │     │
//! │  │        Err ────┼──► return, nothing written                    │     │
//! │  │                ▼                                               │     │
//! │  │  store.write_all(&items, &checkouts)                           │     │
//! │  └────────────────────────────────────────────────────────────────┘     │
//! │                                                                         │
//! │  Two concurrent checkouts of the last unit: the second one waits for    │
//! │  the lock, re-reads quantity 0 and gets OutOfStock.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! List operations read without taking the lock: each backend returns a
//! complete snapshot of a single collection.

use lending_core::ledger::{self, Stocked};
use lending_core::{Checkout, CheckoutRequest, Item, NewItem, ReturnRequest};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::store::RecordStore;

/// Inventory operations over a record store.
///
/// One instance per store. Share it with `Arc`; the mutation lock lives
/// inside, so clones of the store handle behind different services would
/// not be serialized against each other.
#[derive(Debug)]
pub struct InventoryService<S> {
    store: S,
    mutation: Mutex<()>,
}

impl<S: RecordStore> InventoryService<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        InventoryService {
            store,
            mutation: Mutex::new(()),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Short name of the backend in use.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Adds stock, merging into an existing item with the same name and
    /// category (compared trimmed and case-insensitively).
    ///
    /// ## Returns
    /// * `Ok(Item)` - the created or updated item
    /// * `Err(ServiceError::Core(Validation))` - blank text or negative quantity
    pub async fn add_item(&self, new_item: NewItem) -> ServiceResult<Item> {
        let _guard = self.mutation.lock().await;

        let mut items = self.store.read_items().await?;
        let Stocked { item, merged } = ledger::add_or_merge_item(&mut items, new_item)?;
        self.store.write_items(&items).await?;

        if merged {
            info!(item_id = item.id, quantity = item.quantity, "Merged stock into existing item");
        } else {
            info!(item_id = item.id, name = %item.name, "Added item");
        }
        Ok(item)
    }

    /// Returns every item, including ones with zero quantity, in insertion
    /// order.
    pub async fn list_items(&self) -> ServiceResult<Vec<Item>> {
        Ok(self.store.read_items().await?)
    }

    /// Returns checkouts that have not been returned, in insertion order.
    pub async fn list_open_checkouts(&self) -> ServiceResult<Vec<Checkout>> {
        let checkouts = self.store.read_checkouts().await?;
        Ok(ledger::open_checkouts(checkouts))
    }

    /// Lends one unit of an item.
    ///
    /// ## Errors
    /// - `ItemNotFound` / `OutOfStock` / `Validation` from the ledger
    /// - `Store` if reading or writing fails
    pub async fn checkout(&self, request: CheckoutRequest) -> ServiceResult<Checkout> {
        let _guard = self.mutation.lock().await;

        let mut items = self.store.read_items().await?;
        let mut checkouts = self.store.read_checkouts().await?;

        let checkout = ledger::lend(&mut items, &mut checkouts, request).map_err(|err| {
            debug!(error = %err, "Checkout rejected");
            ServiceError::from(err)
        })?;

        self.persist(&items, &checkouts).await?;

        info!(
            checkout_id = checkout.id,
            item_id = checkout.item_id,
            borrower = %checkout.borrower,
            "Item checked out"
        );
        Ok(checkout)
    }

    /// Closes an open checkout and restocks its item.
    ///
    /// ## Errors
    /// - `CheckoutNotFound` / `AlreadyReturned` / `ItemForCheckoutNotFound`
    /// - `Store` if reading or writing fails
    pub async fn return_item(&self, request: ReturnRequest) -> ServiceResult<Checkout> {
        let _guard = self.mutation.lock().await;

        let mut items = self.store.read_items().await?;
        let mut checkouts = self.store.read_checkouts().await?;

        let checkout =
            ledger::return_checkout(&mut items, &mut checkouts, request).map_err(|err| {
                debug!(error = %err, "Return rejected");
                ServiceError::from(err)
            })?;

        self.persist(&items, &checkouts).await?;

        info!(
            checkout_id = checkout.id,
            item_id = checkout.item_id,
            "Item returned"
        );
        Ok(checkout)
    }

    async fn persist(&self, items: &[Item], checkouts: &[Checkout]) -> ServiceResult<()> {
        self.store.write_all(items, checkouts).await.map_err(|err| {
            warn!(backend = self.store.backend(), error = %err, "Failed to persist collections");
            ServiceError::from(err)
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{JsonFileStore, MemoryStore};
    use chrono::NaiveDate;
    use lending_core::{CoreError, ErrorKind};
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn core_err(err: ServiceError) -> CoreError {
        match err {
            ServiceError::Core(err) => err,
            other => panic!("expected core error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_and_merge() {
        let service = InventoryService::new(MemoryStore::new());

        let drill = service.add_item(NewItem::new("Drill", "Tools", 5)).await.unwrap();
        assert_eq!(drill.id, 1);
        assert_eq!(drill.quantity, 5);

        let merged = service.add_item(NewItem::new("drill", "tools", 3)).await.unwrap();
        assert_eq!(merged.id, 1);
        assert_eq!(merged.quantity, 8);

        let items = service.list_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Drill");
    }

    #[tokio::test]
    async fn test_checkout_until_out_of_stock() {
        let service = InventoryService::new(MemoryStore::new());
        let item = service.add_item(NewItem::new("Ladder", "Garden", 1)).await.unwrap();

        let lent = service
            .checkout(CheckoutRequest::new(item.id, "Alice", date("2024-01-01")))
            .await
            .unwrap();
        assert_eq!(lent.id, 1);
        assert!(lent.is_open());
        assert_eq!(service.list_items().await.unwrap()[0].quantity, 0);

        let err = service
            .checkout(CheckoutRequest::new(item.id, "Bob", date("2024-01-02")))
            .await
            .unwrap_err();
        assert!(matches!(core_err(err), CoreError::OutOfStock { .. }));

        // Still listed at zero quantity.
        assert_eq!(service.list_items().await.unwrap().len(), 1);
        assert_eq!(service.list_open_checkouts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_return_restocks_and_closes() {
        let service = InventoryService::new(MemoryStore::new());
        let item = service.add_item(NewItem::new("Drill", "Tools", 1)).await.unwrap();
        let lent = service
            .checkout(CheckoutRequest::new(item.id, "Alice", date("2024-01-01")))
            .await
            .unwrap();

        let returned = service
            .return_item(ReturnRequest {
                checkout_id: lent.id,
                return_date: date("2024-01-05"),
            })
            .await
            .unwrap();
        assert!(returned.returned);
        assert_eq!(returned.return_date, Some(date("2024-01-05")));
        assert_eq!(service.list_items().await.unwrap()[0].quantity, 1);
        assert!(service.list_open_checkouts().await.unwrap().is_empty());

        let err = service
            .return_item(ReturnRequest {
                checkout_id: lent.id,
                return_date: date("2024-02-01"),
            })
            .await
            .unwrap_err();
        assert_eq!(core_err(err).kind(), ErrorKind::Conflict);
        assert_eq!(service.list_items().await.unwrap()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_rejected_operations_do_not_write() {
        let service = InventoryService::new(MemoryStore::new());
        service.add_item(NewItem::new("Drill", "Tools", 0)).await.unwrap();
        let writes = service.store().writes();

        let err = service
            .checkout(CheckoutRequest::new(42, "Alice", date("2024-01-01")))
            .await
            .unwrap_err();
        assert!(matches!(core_err(err), CoreError::ItemNotFound(42)));

        let err = service
            .checkout(CheckoutRequest::new(1, "Alice", date("2024-01-01")))
            .await
            .unwrap_err();
        assert!(matches!(core_err(err), CoreError::OutOfStock { .. }));

        let err = service
            .return_item(ReturnRequest {
                checkout_id: 999,
                return_date: date("2024-01-01"),
            })
            .await
            .unwrap_err();
        assert!(matches!(core_err(err), CoreError::CheckoutNotFound(999)));

        let err = service
            .add_item(NewItem::new("  ", "Tools", 1))
            .await
            .unwrap_err();
        assert_eq!(core_err(err).kind(), ErrorKind::Validation);

        assert_eq!(service.store().writes(), writes);
    }

    #[tokio::test]
    async fn test_return_with_missing_item_is_not_found() {
        let open = Checkout {
            id: 1,
            item_id: 7,
            borrower: "Alice".into(),
            checkout_date: date("2024-01-01"),
            due_date: None,
            returned: false,
            return_date: None,
        };
        let shelf = vec![Item {
            id: 2,
            name: "Saw".into(),
            category: "Tools".into(),
            quantity: 1,
        }];
        let service =
            InventoryService::new(MemoryStore::with_records(shelf.clone(), vec![open.clone()]));

        let err = service
            .return_item(ReturnRequest {
                checkout_id: 1,
                return_date: date("2024-01-05"),
            })
            .await
            .unwrap_err();
        let err = core_err(err);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.reason(), "item_for_checkout");

        // The checkout stays open and nothing was written.
        assert_eq!(service.store().writes(), 0);
        assert_eq!(service.list_open_checkouts().await.unwrap(), vec![open]);
        assert_eq!(service.list_items().await.unwrap(), shelf);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_and_keeps_state() {
        let service = InventoryService::new(MemoryStore::new());
        service.add_item(NewItem::new("Drill", "Tools", 2)).await.unwrap();

        service.store().fail_next_checkouts_write();
        let err = service
            .checkout(CheckoutRequest::new(1, "Alice", date("2024-01-01")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Io(_))));

        // Neither collection moved.
        assert_eq!(service.list_items().await.unwrap()[0].quantity, 2);
        assert!(service.list_open_checkouts().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_never_oversell() {
        let service = Arc::new(InventoryService::new(MemoryStore::new()));
        service.add_item(NewItem::new("Drill", "Tools", 3)).await.unwrap();

        let mut handles = Vec::new();
        for n in 0..10 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .checkout(CheckoutRequest::new(1, format!("Borrower {n}"), date("2024-01-01")))
                    .await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(err) => assert!(matches!(core_err(err), CoreError::OutOfStock { .. })),
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(service.list_items().await.unwrap()[0].quantity, 0);

        let open = service.list_open_checkouts().await.unwrap();
        let ids: Vec<u64> = open.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_get_distinct_ids() {
        let service = Arc::new(InventoryService::new(MemoryStore::new()));

        let mut handles = Vec::new();
        for n in 0..8 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.add_item(NewItem::new(format!("Item {n}"), "Misc", 1)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut ids: Vec<u64> = service.list_items().await.unwrap().iter().map(|i| i.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_json_backend_end_to_end() {
        let tmp = tempfile::TempDir::new().unwrap();
        let service = InventoryService::new(JsonFileStore::open(tmp.path()).unwrap());
        assert_eq!(service.backend(), "json");

        let item = service.add_item(NewItem::new("Tent", "Camping", 2)).await.unwrap();
        let lent = service
            .checkout(
                CheckoutRequest::new(item.id, "Carol", date("2024-06-01")).due(date("2024-06-10")),
            )
            .await
            .unwrap();

        // A fresh service over the same directory sees the same state.
        let reopened = InventoryService::new(JsonFileStore::open(tmp.path()).unwrap());
        assert_eq!(reopened.list_items().await.unwrap()[0].quantity, 1);
        assert_eq!(reopened.list_open_checkouts().await.unwrap(), vec![lent]);
    }
}
