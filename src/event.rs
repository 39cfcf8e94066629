//! Calendar event records
//!
//! An [`EventRecord`] starts life as a candidate pulled from a month listing,
//! may be enriched once from its detail page, and is then handed to storage.

use chrono::{DateTime, NaiveDate, Utc};

/// Maximum number of characters kept from a detail page description
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// A government-meeting event extracted from the calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Link text with the time token removed
    pub title: String,

    /// Calendar day the event is listed under
    pub date: NaiveDate,

    /// Free-form wall-clock time as written on the page, e.g. "6:00pm"
    pub time: Option<String>,

    /// First path segment of the event URL
    pub department: Option<String>,

    pub committee: Option<String>,

    /// Category from the detail page
    pub event_type: Option<String>,

    /// Detail page body, truncated to [`MAX_DESCRIPTION_CHARS`]
    pub description: Option<String>,

    /// Absolute URL of the event's detail page
    pub source_url: String,

    /// Set once when the candidate is extracted
    pub scraped_at: DateTime<Utc>,
}

impl EventRecord {
    /// Creates a candidate with only the listing-page fields filled in
    pub fn candidate(
        title: impl Into<String>,
        date: NaiveDate,
        time: Option<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            time,
            department: None,
            committee: None,
            event_type: None,
            description: None,
            source_url: source_url.into(),
            scraped_at: Utc::now(),
        }
    }

    /// Returns the uniqueness tuple for this record
    pub fn key(&self) -> EventKey {
        EventKey {
            title: self.title.clone(),
            date: self.date,
            time: self.time.clone().unwrap_or_default(),
            source_url: self.source_url.clone(),
        }
    }

    /// Sets the description, keeping at most [`MAX_DESCRIPTION_CHARS`] characters
    pub fn set_description(&mut self, description: &str) {
        self.description = Some(truncate_chars(description, MAX_DESCRIPTION_CHARS));
    }
}

/// Logical identity of an event: (title, date, time, source_url)
///
/// An absent time is represented by the empty string so that two untimed
/// events with the same title, date and URL compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    pub source_url: String,
}

/// A persisted event with its storage identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: i64,
    pub event: EventRecord,
}

/// Orders by date ascending, then by time as a plain string
pub(crate) fn listing_order(a: &EventRecord, b: &EventRecord) -> std::cmp::Ordering {
    a.date.cmp(&b.date).then_with(|| {
        a.time
            .as_deref()
            .unwrap_or("")
            .cmp(b.time.as_deref().unwrap_or(""))
    })
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
