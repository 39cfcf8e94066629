//! Statistics generation from the calendar database
//!
//! This module provides functionality for extracting and displaying
//! statistics about stored calendar entries.

use crate::storage::Storage;
use crate::CalendarError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Label used for entries whose URL has no department segment
const NO_DEPARTMENT: &str = "(none)";

/// Calendar statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarStatistics {
    /// Total number of stored entries
    pub total_entries: u64,

    /// Earliest event date, if any entries exist
    pub first_date: Option<NaiveDate>,

    /// Latest event date, if any entries exist
    pub last_date: Option<NaiveDate>,

    /// Count of entries per department
    pub by_department: BTreeMap<String, u64>,

    /// Entries with no listed time
    pub untimed_entries: u64,

    /// Entries that picked up a description from their detail page
    pub described_entries: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CalendarStatistics)` - Successfully loaded statistics
/// * `Err(CalendarError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CalendarStatistics, CalendarError> {
    let total_entries = storage.get_entry_count()?;
    let entries = storage.get_all_entries()?;

    let mut by_department = BTreeMap::new();
    let mut untimed_entries = 0;
    let mut described_entries = 0;

    for entry in &entries {
        let department = entry
            .event
            .department
            .clone()
            .unwrap_or_else(|| NO_DEPARTMENT.to_string());
        *by_department.entry(department).or_insert(0) += 1;

        if entry.event.time.is_none() {
            untimed_entries += 1;
        }
        if entry.event.description.is_some() {
            described_entries += 1;
        }
    }

    // Entries come back in date order
    let first_date = entries.first().map(|entry| entry.event.date);
    let last_date = entries.last().map(|entry| entry.event.date);

    Ok(CalendarStatistics {
        total_entries,
        first_date,
        last_date,
        by_department,
        untimed_entries,
        described_entries,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CalendarStatistics) {
    println!("=== Calendar Statistics ===\n");

    println!("Overview:");
    println!("  Total entries: {}", stats.total_entries);
    match (stats.first_date, stats.last_date) {
        (Some(first), Some(last)) => println!("  Date span: {} to {}", first, last),
        _ => println!("  Date span: (empty)"),
    }
    println!("  Without a time: {}", stats.untimed_entries);
    println!();

    if !stats.by_department.is_empty() {
        println!("Entries by Department:");
        // Sort departments by count (descending)
        let mut department_counts: Vec<_> = stats.by_department.iter().collect();
        department_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (department, count) in department_counts {
            let percentage = if stats.total_entries > 0 {
                (*count as f64 / stats.total_entries as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", department, count, percentage);
        }
        println!();
    }

    let enrichment_rate = if stats.total_entries > 0 {
        (stats.described_entries as f64 / stats.total_entries as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Enrichment Rate: {:.1}% ({} / {} entries with a description)",
        enrichment_rate, stats.described_entries, stats.total_entries
    );
}
