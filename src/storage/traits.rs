//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::event::{EventRecord, StoredEntry};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of an insert-if-absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created with this id
    Inserted(i64),

    /// The uniqueness tuple already existed; this is the existing row's id
    Duplicate(i64),
}

impl InsertOutcome {
    /// The id of the row holding the entry
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Duplicate(id) => *id,
        }
    }

    /// Returns true if this call created the row
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Trait for storage backend implementations
///
/// Entries are keyed by (title, date, time, source_url). Listing methods
/// return entries ordered by date, then by time compared as strings.
pub trait Storage {
    /// Prepares the backend; safe to call any number of times
    fn init(&mut self) -> StorageResult<()>;

    /// Stores an entry unless its uniqueness tuple is already present
    ///
    /// The check and the insert happen as one operation, so concurrent
    /// crawls cannot both create the same entry.
    fn insert_entry(&mut self, record: &EventRecord) -> StorageResult<InsertOutcome>;

    /// Gets entries dated within `start..=end`
    fn get_entries_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StorageResult<Vec<StoredEntry>>;

    /// Gets every stored entry
    fn get_all_entries(&self) -> StorageResult<Vec<StoredEntry>>;

    /// Gets total entry count
    fn get_entry_count(&self) -> StorageResult<u64>;

    /// Removes every entry
    fn clear_all_entries(&mut self) -> StorageResult<()>;
}
