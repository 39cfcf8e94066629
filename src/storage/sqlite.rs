//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::event::{EventRecord, StoredEntry};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{InsertOutcome, Storage, StorageResult};
use crate::CalendarError;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT id, title, date, time, department, committee, event_type,
     description, source_url, scraped_at FROM calendar_entries";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CalendarError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CalendarError> {
        let conn = Connection::open(path)?;

        // WAL lets a reader (--list, --stats) run beside a crawl
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CalendarError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<StoredEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params, row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

impl Storage for SqliteStorage {
    fn init(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    fn insert_entry(&mut self, record: &EventRecord) -> StorageResult<InsertOutcome> {
        let time = record.time.as_deref().unwrap_or("");

        let changed = self.conn.execute(
            "INSERT INTO calendar_entries
             (title, date, time, department, committee, event_type, description, source_url, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(title, date, time, source_url) DO NOTHING",
            params![
                record.title,
                record.date,
                time,
                record.department,
                record.committee,
                record.event_type,
                record.description,
                record.source_url,
                record.scraped_at,
            ],
        )?;

        if changed > 0 {
            return Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid()));
        }

        let existing: i64 = self.conn.query_row(
            "SELECT id FROM calendar_entries
             WHERE title = ?1 AND date = ?2 AND time = ?3 AND source_url = ?4",
            params![record.title, record.date, time, record.source_url],
            |row| row.get(0),
        )?;

        Ok(InsertOutcome::Duplicate(existing))
    }

    fn get_entries_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StorageResult<Vec<StoredEntry>> {
        let sql = format!(
            "{} WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, time ASC, id ASC",
            SELECT_COLUMNS
        );
        self.query_entries(&sql, params![start, end])
    }

    fn get_all_entries(&self) -> StorageResult<Vec<StoredEntry>> {
        let sql = format!("{} ORDER BY date ASC, time ASC, id ASC", SELECT_COLUMNS);
        self.query_entries(&sql, [])
    }

    fn get_entry_count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM calendar_entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn clear_all_entries(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM calendar_entries", [])?;
        Ok(())
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    let time: String = row.get(3)?;
    Ok(StoredEntry {
        id: row.get(0)?,
        event: EventRecord {
            title: row.get(1)?,
            date: row.get(2)?,
            time: if time.is_empty() { None } else { Some(time) },
            department: row.get(4)?,
            committee: row.get(5)?,
            event_type: row.get(6)?,
            description: row.get(7)?,
            source_url: row.get(8)?,
            scraped_at: row.get(9)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, day: NaiveDate, time: Option<&str>) -> EventRecord {
        EventRecord::candidate(
            title,
            day,
            time.map(str::to_string),
            format!("https://www.wayland.ma.us/board/events/{}", title.len()),
        )
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.init().unwrap();
        storage.init().unwrap();
        assert_eq!(storage.get_entry_count().unwrap(), 0);
    }

    #[test]
    fn test_insert_entry() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let outcome = storage
            .insert_entry(&event("Select Board", date(2025, 9, 4), Some("6:00pm")))
            .unwrap();
        assert!(outcome.is_new());
        assert!(outcome.id() > 0);
    }

    #[test]
    fn test_insert_duplicate_entry() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let record = event("Select Board", date(2025, 9, 4), Some("6:00pm"));

        let first = storage.insert_entry(&record).unwrap();
        let second = storage.insert_entry(&record).unwrap();

        assert_eq!(second, InsertOutcome::Duplicate(first.id()));
        assert_eq!(storage.get_entry_count().unwrap(), 1);
    }

    #[test]
    fn test_insert_duplicate_without_time() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let record = event("Town Meeting", date(2025, 10, 1), None);

        storage.insert_entry(&record).unwrap();
        let second = storage.insert_entry(&record).unwrap();

        assert!(!second.is_new());
        assert_eq!(storage.get_entry_count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_keeps_first_enrichment() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut first = event("Select Board", date(2025, 9, 4), Some("6:00pm"));
        first.description = Some("Original agenda".to_string());
        let mut second = first.clone();
        second.description = Some("Changed agenda".to_string());

        storage.insert_entry(&first).unwrap();
        storage.insert_entry(&second).unwrap();

        let entries = storage.get_all_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event.description.as_deref(), Some("Original agenda"));
    }

    #[test]
    fn test_roundtrip_fields() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut record = event("Board of Assessors", date(2025, 9, 4), Some("6:00pm"));
        record.department = Some("board-assessors".to_string());
        record.event_type = Some("Public Meeting".to_string());
        record.description = Some("Regular monthly meeting".to_string());

        storage.insert_entry(&record).unwrap();
        let entries = storage.get_all_entries().unwrap();

        assert_eq!(entries.len(), 1);
        let stored = &entries[0].event;
        assert_eq!(stored.title, record.title);
        assert_eq!(stored.date, record.date);
        assert_eq!(stored.time, record.time);
        assert_eq!(stored.department, record.department);
        assert_eq!(stored.event_type, record.event_type);
        assert_eq!(stored.description, record.description);
        assert_eq!(stored.source_url, record.source_url);
        assert_eq!(stored.scraped_at, record.scraped_at);
    }

    #[test]
    fn test_date_range_is_inclusive_and_ordered() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.insert_entry(&event("Late", date(2025, 9, 30), Some("7:00pm"))).unwrap();
        storage.insert_entry(&event("Evening", date(2025, 9, 1), Some("6:00pm"))).unwrap();
        storage.insert_entry(&event("Morning", date(2025, 9, 1), Some("10:00am"))).unwrap();
        storage.insert_entry(&event("Untimed", date(2025, 9, 1), None)).unwrap();
        storage.insert_entry(&event("October", date(2025, 10, 1), None)).unwrap();
        storage.insert_entry(&event("August", date(2025, 8, 31), None)).unwrap();

        let entries = storage
            .get_entries_by_date_range(date(2025, 9, 1), date(2025, 9, 30))
            .unwrap();
        let titles: Vec<_> = entries.iter().map(|e| e.event.title.as_str()).collect();

        // string comparison on time: "" < "10:00am" < "6:00pm"
        assert_eq!(titles, vec!["Untimed", "Morning", "Evening", "Late"]);
    }

    #[test]
    fn test_clear_all_entries() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.insert_entry(&event("A", date(2025, 9, 1), None)).unwrap();
        storage.insert_entry(&event("B", date(2025, 9, 2), None)).unwrap();
        assert_eq!(storage.get_entry_count().unwrap(), 2);

        storage.clear_all_entries().unwrap();
        assert_eq!(storage.get_entry_count().unwrap(), 0);
        assert!(storage.get_all_entries().unwrap().is_empty());
    }
}
