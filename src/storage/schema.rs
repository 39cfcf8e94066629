//! Database schema definitions
//!
//! This module contains the SQL schema for the Civic-Calendar database.

/// SQL schema for the database
///
/// `time` is stored as '' when absent: SQLite treats NULLs as distinct in
/// UNIQUE constraints, which would let untimed duplicates through.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS calendar_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    time TEXT NOT NULL DEFAULT '',
    department TEXT,
    committee TEXT,
    event_type TEXT,
    description TEXT,
    source_url TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    UNIQUE(title, date, time, source_url)
);

CREATE INDEX IF NOT EXISTS idx_calendar_entries_date ON calendar_entries(date, time);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
