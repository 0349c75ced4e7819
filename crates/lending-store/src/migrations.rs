//! # SQLite Migrations
//!
//! Embedded schema migrations for the SQLite record store.
//!
//! ```text
//! SqliteStore::connect
//!       │
//!       ▼
//! _sqlx_migrations exists? ── no ──► create it
//!       │
//!       ▼
//! 001_initial_schema.sql   items + checkouts tables
//!       │
//!       ▼
//! record checksum, continue startup
//! ```
//!
//! New migrations go in `migrations/sqlite/` at the workspace root as
//! `NNN_description.sql`. Existing files are never edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Migrations embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies all pending migrations. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Checking for pending migrations");
    MIGRATOR.run(pool).await?;
    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, usize::try_from(applied).unwrap_or(0)))
}
