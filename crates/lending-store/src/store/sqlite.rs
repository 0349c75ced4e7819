//! # SQLite Record Store
//!
//! Keeps the two collections in two tables of one SQLite database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Record Store                                │
//! │                                                                         │
//! │  SqliteConfig::new(path)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::connect(config).await ← pool + WAL + migrations           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐        ┌──────────────────────────────┐       │
//! │  │ items                │        │ checkouts                    │       │
//! │  │ id, position, name,  │        │ id, position, item_id,       │       │
//! │  │ category, quantity   │        │ borrower, *_date, returned   │       │
//! │  └──────────────────────┘        └──────────────────────────────┘       │
//! │                                                                         │
//! │  write_items     = BEGIN; DELETE; INSERT ...; COMMIT                    │
//! │  write_all       = one transaction over BOTH tables                     │
//! │  read_*          = SELECT ... ORDER BY position                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are checked at runtime (`sqlx::query`), so building this crate
//! does not need a live database or offline query data.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use lending_core::{Checkout, Item};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use super::RecordStore;
use crate::error::{StoreError, StoreResult};
use crate::migrations;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// SQLite store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SqliteConfig::new("./data/lending.db").max_connections(4);
/// let store = SqliteStore::connect(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of pooled connections.
    /// Default: 5
    pub max_connections: u32,

    /// Connections kept open while idle.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a connection (and for a locked database).
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle time before a pooled connection is closed.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to apply migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl SqliteConfig {
    /// Creates a configuration for the database file at `path`.
    ///
    /// The file and its parent directory are created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory configuration.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to exactly one connection that never expires.
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Checks if this configuration targets an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    category: String,
    quantity: i64,
}

impl TryFrom<ItemRow> for Item {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|_| StoreError::corrupt("items", format!("invalid id {}", row.id)))?;
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            StoreError::corrupt("items", format!("item {id} has quantity {}", row.quantity))
        })?;

        Ok(Item {
            id,
            name: row.name,
            category: row.category,
            quantity,
        })
    }
}

#[derive(Debug, FromRow)]
struct CheckoutRow {
    id: i64,
    item_id: i64,
    borrower: String,
    checkout_date: NaiveDate,
    due_date: Option<NaiveDate>,
    returned: bool,
    return_date: Option<NaiveDate>,
}

impl TryFrom<CheckoutRow> for Checkout {
    type Error = StoreError;

    fn try_from(row: CheckoutRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|_| StoreError::corrupt("checkouts", format!("invalid id {}", row.id)))?;
        let item_id = u64::try_from(row.item_id).map_err(|_| {
            StoreError::corrupt("checkouts", format!("checkout {id} has item_id {}", row.item_id))
        })?;

        Ok(Checkout {
            id,
            item_id,
            borrower: row.borrower,
            checkout_date: row.checkout_date,
            due_date: row.due_date,
            returned: row.returned,
            return_date: row.return_date,
        })
    }
}

fn to_sql_id(collection: &str, id: u64) -> StoreResult<i64> {
    i64::try_from(id).map_err(|_| StoreError::corrupt(collection, format!("id {id} out of range")))
}

fn to_sql_position(collection: &str, index: usize) -> StoreResult<i64> {
    i64::try_from(index)
        .map_err(|_| StoreError::corrupt(collection, format!("position {index} out of range")))
}

// =============================================================================
// Store
// =============================================================================

/// Record store backed by a pooled SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database, configures the pool and applies migrations.
    ///
    /// ## What This Does
    /// 1. Creates the parent directory and database file if missing
    /// 2. File databases use WAL journaling with NORMAL synchronous
    /// 3. Builds the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn connect(config: SqliteConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing SQLite record store"
        );

        let (connect_options, pool_options) = if config.is_in_memory() {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
                .busy_timeout(config.connect_timeout);
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (options, pool)
        } else {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(config.connect_timeout);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .idle_timeout(Some(config.idle_timeout));
            (options, pool)
        };

        let pool = pool_options
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "SQLite pool created"
        );

        let store = SqliteStore { pool };

        if config.run_migrations {
            migrations::run_migrations(&store.pool).await?;
        }

        Ok(store)
    }

    /// Returns the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the database answers queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the pool. Later operations fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing SQLite connection pool");
        self.pool.close().await;
    }

    async fn replace_items(tx: &mut Transaction<'_, Sqlite>, items: &[Item]) -> StoreResult<()> {
        sqlx::query("DELETE FROM items").execute(&mut **tx).await?;

        for (index, item) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO items (id, position, name, category, quantity) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(to_sql_id("items", item.id)?)
            .bind(to_sql_position("items", index)?)
            .bind(&item.name)
            .bind(&item.category)
            .bind(i64::from(item.quantity))
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    async fn replace_checkouts(
        tx: &mut Transaction<'_, Sqlite>,
        checkouts: &[Checkout],
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM checkouts").execute(&mut **tx).await?;

        for (index, checkout) in checkouts.iter().enumerate() {
            sqlx::query(
                "INSERT INTO checkouts \
                 (id, position, item_id, borrower, checkout_date, due_date, returned, return_date) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(to_sql_id("checkouts", checkout.id)?)
            .bind(to_sql_position("checkouts", index)?)
            .bind(to_sql_id("checkouts", checkout.item_id)?)
            .bind(&checkout.borrower)
            .bind(checkout.checkout_date)
            .bind(checkout.due_date)
            .bind(checkout.returned)
            .bind(checkout.return_date)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn read_items(&self) -> StoreResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, name, category, quantity FROM items ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Read items");
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn read_checkouts(&self) -> StoreResult<Vec<Checkout>> {
        let rows: Vec<CheckoutRow> = sqlx::query_as(
            "SELECT id, item_id, borrower, checkout_date, due_date, returned, return_date \
             FROM checkouts ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Read checkouts");
        rows.into_iter().map(Checkout::try_from).collect()
    }

    async fn write_items(&self, items: &[Item]) -> StoreResult<()> {
        debug!(count = items.len(), "Writing items");
        let mut tx = self.pool.begin().await?;
        Self::replace_items(&mut tx, items).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn write_checkouts(&self, checkouts: &[Checkout]) -> StoreResult<()> {
        debug!(count = checkouts.len(), "Writing checkouts");
        let mut tx = self.pool.begin().await?;
        Self::replace_checkouts(&mut tx, checkouts).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn write_all(&self, items: &[Item], checkouts: &[Checkout]) -> StoreResult<()> {
        debug!(
            items = items.len(),
            checkouts = checkouts.len(),
            "Writing both collections"
        );

        // Dropping `tx` on an early return rolls both tables back.
        let mut tx = self.pool.begin().await?;
        Self::replace_items(&mut tx, items).await?;
        Self::replace_checkouts(&mut tx, checkouts).await?;
        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
