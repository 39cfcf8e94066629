//! Plain-text listing of stored entries

use crate::event::StoredEntry;
use std::io::{self, Write};

/// Formats one entry as a single line
///
/// `2025-09-04  6:00pm    Select Board [select-board] <url>`; untimed entries
/// show a blank time column.
pub fn format_entry(entry: &StoredEntry) -> String {
    let event = &entry.event;
    let mut line = format!(
        "{}  {:<8}  {}",
        event.date,
        event.time.as_deref().unwrap_or(""),
        event.title
    );

    if let Some(department) = &event.department {
        line.push_str(&format!(" [{}]", department));
    }
    if let Some(event_type) = &event.event_type {
        line.push_str(&format!(" ({})", event_type));
    }
    line.push_str(&format!(" <{}>", event.source_url));
    line
}

/// Writes entries one per line, in the order given
pub fn write_entries<W: Write>(out: &mut W, entries: &[StoredEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", format_entry(entry))?;
    }
    writeln!(out, "\n{} entries", entries.len())
}

/// Prints entries to stdout
pub fn print_entries(entries: &[StoredEntry]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_entries(&mut handle, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventRecord;
    use chrono::NaiveDate;

    fn entry(time: Option<&str>) -> StoredEntry {
        let mut event = EventRecord::candidate(
            "Select Board",
            NaiveDate::from_ymd_opt(2025, 9, 4).unwrap(),
            time.map(str::to_string),
            "https://www.wayland.ma.us/select-board/events/1",
        );
        event.department = Some("select-board".to_string());
        StoredEntry { id: 1, event }
    }

    #[test]
    fn test_format_timed_entry() {
        let line = format_entry(&entry(Some("6:00pm")));
        assert_eq!(
            line,
            "2025-09-04  6:00pm    Select Board [select-board] <https://www.wayland.ma.us/select-board/events/1>"
        );
    }

    #[test]
    fn test_format_untimed_entry() {
        let line = format_entry(&entry(None));
        assert!(line.starts_with("2025-09-04            Select Board"));
    }

    #[test]
    fn test_write_entries_counts() {
        let mut out = Vec::new();
        write_entries(&mut out, &[entry(None), entry(Some("7:00pm"))]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with("2 entries\n"));
    }
}
