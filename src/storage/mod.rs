//! Storage module for persisting calendar entries
//!
//! This module handles all persistence for the crawler, including:
//! - SQLite database initialization and schema management
//! - Duplicate-safe entry insertion keyed by (title, date, time, source_url)
//! - Ordered range queries for readers
//! - An in-memory backend with the same contract

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{InsertOutcome, Storage, StorageError, StorageResult};

use crate::CalendarError;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A storage backend shared between crawls and readers
pub type SharedStorage<S> = Arc<Mutex<S>>;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CalendarError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CalendarError> {
    SqliteStorage::new(path)
}

/// Wraps a backend for sharing
pub fn shared<S: Storage>(storage: S) -> SharedStorage<S> {
    Arc::new(Mutex::new(storage))
}

/// Locks a shared backend, mapping poisoning to a storage error
pub fn lock<S>(storage: &SharedStorage<S>) -> StorageResult<MutexGuard<'_, S>> {
    storage.lock().map_err(|_| StorageError::LockPoisoned)
}
