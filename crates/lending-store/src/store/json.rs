//! # JSON File Store
//!
//! Keeps each collection in its own pretty-printed JSON array:
//!
//! ```text
//! <data dir>/
//! ├── items.json       [{"id":1,"name":"Drill","category":"Tools","quantity":4}, ...]
//! └── checkouts.json   [{"id":1,"item_id":1,"borrower":"Alice",
//!                        "checkout_date":"2024-01-01","due_date":null,
//!                        "returned":false,"return_date":null}, ...]
//! ```
//!
//! ## Atomic Replace
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  write_items(items)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  .tmpXXXX in the same dir ◄── serialize + fsync                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rename(.tmpXXXX → items.json)   ← readers see old OR new, never half   │
//! │                                                                         │
//! │  write_all(items, checkouts)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stage items tmp + checkouts tmp (both fsynced)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rename items, rename checkouts   ← crash window = between two renames  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! File I/O is blocking and runs on `spawn_blocking`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lending_core::{Checkout, Item};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::RecordStore;
use crate::error::{StoreError, StoreResult};

/// File name of the items collection.
pub const ITEMS_FILE: &str = "items.json";

/// File name of the checkouts collection.
pub const CHECKOUTS_FILE: &str = "checkouts.json";

/// Record store backed by two JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (and if needed creates) a store in `dir`.
    ///
    /// Both collection files are created as `[]` if missing.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let store = JsonFileStore { dir };
        ensure_collection::<Item>(&store.dir, &store.items_path())?;
        ensure_collection::<Checkout>(&store.dir, &store.checkouts_path())?;

        info!(dir = %store.dir.display(), "JSON record store opened");
        Ok(store)
    }

    /// Path of `items.json`.
    pub fn items_path(&self) -> PathBuf {
        self.dir.join(ITEMS_FILE)
    }

    /// Path of `checkouts.json`.
    pub fn checkouts_path(&self) -> PathBuf {
        self.dir.join(CHECKOUTS_FILE)
    }

    async fn read<T>(&self, path: PathBuf) -> StoreResult<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || read_collection::<T>(&dir, &path)).await?
    }

    async fn write<T>(&self, path: PathBuf, records: Vec<T>) -> StoreResult<()>
    where
        T: Serialize + Send + 'static,
    {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let staged = stage(&dir, &records)?;
            commit(staged, &path)?;
            sync_dir(&dir)
        })
        .await?
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn read_items(&self) -> StoreResult<Vec<Item>> {
        let items: Vec<Item> = self.read(self.items_path()).await?;
        debug!(count = items.len(), "Read items");
        Ok(items)
    }

    async fn read_checkouts(&self) -> StoreResult<Vec<Checkout>> {
        let checkouts: Vec<Checkout> = self.read(self.checkouts_path()).await?;
        debug!(count = checkouts.len(), "Read checkouts");
        Ok(checkouts)
    }

    async fn write_items(&self, items: &[Item]) -> StoreResult<()> {
        debug!(count = items.len(), "Writing items");
        self.write(self.items_path(), items.to_vec()).await
    }

    async fn write_checkouts(&self, checkouts: &[Checkout]) -> StoreResult<()> {
        debug!(count = checkouts.len(), "Writing checkouts");
        self.write(self.checkouts_path(), checkouts.to_vec()).await
    }

    async fn write_all(&self, items: &[Item], checkouts: &[Checkout]) -> StoreResult<()> {
        debug!(
            items = items.len(),
            checkouts = checkouts.len(),
            "Writing both collections"
        );

        let dir = self.dir.clone();
        let items_path = self.items_path();
        let checkouts_path = self.checkouts_path();
        let items = items.to_vec();
        let checkouts = checkouts.to_vec();

        tokio::task::spawn_blocking(move || {
            // Stage both before renaming either.
            let staged_items = stage(&dir, &items)?;
            let staged_checkouts = stage(&dir, &checkouts)?;

            commit(staged_items, &items_path)?;
            commit(staged_checkouts, &checkouts_path)?;
            sync_dir(&dir)
        })
        .await?
    }
}

// =============================================================================
// Blocking helpers
// =============================================================================

fn parse_collection<T: DeserializeOwned>(contents: &str) -> StoreResult<Vec<T>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(contents)?)
}

/// Reads a collection file, creating it as `[]` if it does not exist.
fn read_collection<T>(dir: &Path, path: &Path) -> StoreResult<Vec<T>>
where
    T: Serialize + DeserializeOwned,
{
    match fs::read_to_string(path) {
        Ok(contents) => parse_collection(&contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            ensure_collection::<T>(dir, path)?;
            parse_collection(&fs::read_to_string(path)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Creates `path` as an empty array unless it already exists.
///
/// Uses a no-clobber rename so a reader initializing the file can never
/// overwrite a collection that a writer put in place first.
fn ensure_collection<T: Serialize>(dir: &Path, path: &Path) -> StoreResult<()> {
    if path.exists() {
        return Ok(());
    }

    let staged = stage::<T>(dir, &[])?;
    match staged.persist_noclobber(path) {
        Ok(_) => {
            debug!(path = %path.display(), "Initialized empty collection");
            Ok(())
        }
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(err) => Err(StoreError::Io(err.error)),
    }
}

/// Serializes `records` into a synced temp file next to the target.
fn stage<T: Serialize>(dir: &Path, records: &[T]) -> StoreResult<NamedTempFile> {
    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, records)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    Ok(file)
}

/// Renames a staged file over `path`.
fn commit(staged: NamedTempFile, path: &Path) -> StoreResult<()> {
    staged.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> StoreResult<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
