//! # lending-store: Persistence Layer for the Lending Tracker
//!
//! Record stores for items and checkouts, and the service that runs the
//! inventory rules against them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Lending Tracker Data Flow                          │
//! │                                                                         │
//! │  HTTP handler (POST /api/checkout)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  lending-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────┐        ┌─────────────────────────────┐  │   │
//! │  │   │ InventoryService │        │ RecordStore                 │  │   │
//! │  │   │ (service.rs)     │───────►│  JsonFileStore  (json.rs)   │  │   │
//! │  │   │                  │        │  SqliteStore    (sqlite.rs) │  │   │
//! │  │   │ mutation lock    │        │  MemoryStore    (memory.rs) │  │   │
//! │  │   │ lending_core::   │        └─────────────────────────────┘  │   │
//! │  │   │   ledger rules   │                                          │   │
//! │  │   └──────────────────┘                                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  items.json + checkouts.json    OR    lending.db (items, checkouts)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `RecordStore` trait and its backends
//! - [`service`] - `InventoryService`, the five lending operations
//! - [`migrations`] - Embedded SQLite migrations
//! - [`error`] - Store and service error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lending_core::NewItem;
//! use lending_store::{InventoryService, JsonFileStore};
//!
//! let service = InventoryService::new(JsonFileStore::open("./data")?);
//! let drill = service.add_item(NewItem::new("Drill", "Tools", 3)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use service::InventoryService;
pub use store::{JsonFileStore, MemoryStore, RecordStore, SqliteConfig, SqliteStore};
