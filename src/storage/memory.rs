//! In-memory storage implementation
//!
//! Keeps entries in a vector with a key index. Nothing survives the process;
//! useful for trial crawls and tests.

use crate::event::{listing_order, EventKey, EventRecord, StoredEntry};
use crate::storage::traits::{InsertOutcome, Storage, StorageResult};
use chrono::NaiveDate;
use std::collections::HashMap;

/// In-memory storage backend
#[derive(Debug)]
pub struct MemoryStorage {
    entries: Vec<StoredEntry>,
    index: HashMap<EventKey, i64>,
    next_id: i64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    fn sorted(&self, mut entries: Vec<StoredEntry>) -> Vec<StoredEntry> {
        entries.sort_by(|a, b| listing_order(&a.event, &b.event).then(a.id.cmp(&b.id)));
        entries
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn init(&mut self) -> StorageResult<()> {
        tracing::debug!("Memory storage ready ({} entries)", self.entries.len());
        Ok(())
    }

    fn insert_entry(&mut self, record: &EventRecord) -> StorageResult<InsertOutcome> {
        let key = record.key();
        if let Some(&id) = self.index.get(&key) {
            return Ok(InsertOutcome::Duplicate(id));
        }

        let id = self.next_id;
        self.next_id += 1;

        self.index.insert(key, id);
        self.entries.push(StoredEntry {
            id,
            event: record.clone(),
        });

        Ok(InsertOutcome::Inserted(id))
    }

    fn get_entries_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StorageResult<Vec<StoredEntry>> {
        let matching = self
            .entries
            .iter()
            .filter(|entry| entry.event.date >= start && entry.event.date <= end)
            .cloned()
            .collect();
        Ok(self.sorted(matching))
    }

    fn get_all_entries(&self) -> StorageResult<Vec<StoredEntry>> {
        Ok(self.sorted(self.entries.clone()))
    }

    fn get_entry_count(&self) -> StorageResult<u64> {
        Ok(self.entries.len() as u64)
    }

    fn clear_all_entries(&mut self) -> StorageResult<()> {
        self.entries.clear();
        self.index.clear();
        Ok(())
    }
}
