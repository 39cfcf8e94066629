//! Output module for reporting on stored calendar entries
//!
//! This module handles:
//! - Printing stored entries as a plain-text listing
//! - Computing and printing calendar statistics

mod listing;
pub mod stats;

pub use listing::{format_entry, print_entries, write_entries};
pub use stats::{load_statistics, print_statistics, CalendarStatistics};

use crate::storage::Storage;
use crate::StoredEntry;
use crate::CalendarError;
use chrono::NaiveDate;

/// Loads the entries a listing should show
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `range` - Optional inclusive date bounds; `None` lists everything
///
/// # Returns
///
/// * `Ok(Vec<StoredEntry>)` - Entries ordered by date then time
/// * `Err(CalendarError)` - Failed to query storage
pub fn load_entries(
    storage: &dyn Storage,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<StoredEntry>, CalendarError> {
    let entries = match range {
        Some((start, end)) => storage.get_entries_by_date_range(start, end)?,
        None => storage.get_all_entries()?,
    };
    Ok(entries)
}
