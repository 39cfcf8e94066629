//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the month-by-month crawl loop, including:
//! - Stepping through the requested range one calendar month at a time
//! - Fetching and parsing each month's listing page
//! - Enriching and storing candidates one at a time
//! - Reporting progress after every logical step
//!
//! Errors are contained at month or entry granularity; a crawl always runs
//! to completion.

use crate::config::{Config, SiteConfig};
use crate::crawler::enricher::Enricher;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::MonthParser;
use crate::crawler::progress::{CrawlProgress, ProgressSink};
use crate::event::EventRecord;
use crate::site::{base_url, month_url};
use crate::state::CrawlTally;
use crate::storage::{lock, InsertOutcome, SharedStorage, Storage, StorageResult};
use crate::CalendarError;
use chrono::{Datelike, Months, NaiveDate};
use std::sync::Arc;

/// Outcome of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Months whose listing was attempted
    pub months_visited: u32,

    /// Genuinely new entries stored
    pub total_entries: u64,

    /// Labels of months whose listing could not be fetched
    pub failed_months: Vec<String>,
}

/// Returns the first day of every calendar month touched by `start..=end`
///
/// Steps by calendar month, so a range spanning any part of N months yields
/// exactly N dates. An inverted range yields nothing.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use civic_calendar::crawler::month_starts;
///
/// let start = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
/// assert_eq!(month_starts(start, end).len(), 2);
/// ```
pub fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut current = start.with_day(1);

    while let Some(month) = current {
        if month > end {
            break;
        }
        months.push(month);
        current = month.checked_add_months(Months::new(1));
    }

    months
}

/// Label shown in progress updates, e.g. "September 2025"
pub fn month_label(month_start: NaiveDate) -> String {
    month_start.format("%B %Y").to_string()
}

/// Main crawler coordinator structure
///
/// Holds no per-crawl state; every call to [`Coordinator::run`] keeps its own
/// tally, so one coordinator can serve several crawls.
pub struct Coordinator<S: Storage> {
    site: SiteConfig,
    fetcher: Arc<Fetcher>,
    parser: MonthParser,
    enricher: Enricher,
    storage: SharedStorage<S>,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `storage` - Backend receiving the crawled entries
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CalendarError)` - Bad site URL or HTTP client setup failure
    pub fn new(config: &Config, storage: SharedStorage<S>) -> Result<Self, CalendarError> {
        let fetcher = Fetcher::new(&config.fetcher)?;
        let parser = MonthParser::new(base_url(&config.site)?);
        Ok(Self::from_parts(
            config.site.clone(),
            fetcher,
            parser,
            storage,
        ))
    }

    /// Assembles a coordinator from prebuilt components
    pub fn from_parts(
        site: SiteConfig,
        fetcher: Fetcher,
        parser: MonthParser,
        storage: SharedStorage<S>,
    ) -> Self {
        let fetcher = Arc::new(fetcher);
        Self {
            site,
            enricher: Enricher::new(Arc::clone(&fetcher)),
            fetcher,
            parser,
            storage,
        }
    }

    /// Crawls every month touched by `start..=end`
    ///
    /// Progress goes to `progress`: once at each month start, once per newly
    /// stored entry, once with an error when a month's listing fails, and
    /// exactly once at the end with the completion flag set.
    pub async fn run(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        progress: &dyn ProgressSink,
    ) -> CrawlSummary {
        let mut tally = CrawlTally::new();

        tracing::info!("Starting crawl from {} to {}", start, end);

        if let Err(e) = self.init_storage() {
            tracing::error!("Failed to initialize storage: {}", e);
            progress.report(&CrawlProgress::failed(
                month_label(start),
                0,
                0,
                format!("Failed to initialize storage: {}", e),
            ));
        }

        for month_start in month_starts(start, end) {
            if let Err(e) = tally.begin_month(month_start) {
                tracing::error!("Skipping {}: {}", month_start, e);
                continue;
            }

            let label = month_label(month_start);
            progress.report(&CrawlProgress::month(&label, tally.total_entries(), 0));

            let candidates = match self.month_candidates(month_start).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::error!("Error scraping month {}: {}", label, e);
                    progress.report(&CrawlProgress::failed(
                        &label,
                        tally.total_entries(),
                        0,
                        format!("Error scraping {}: {}", label, e),
                    ));
                    tally.record_month_failure(label);
                    continue;
                }
            };

            for candidate in candidates {
                let record = self.enricher.enrich(candidate).await;

                match self.store(&record) {
                    Ok(InsertOutcome::Inserted(id)) => {
                        tracing::debug!("Stored entry {}: {} on {}", id, record.title, record.date);
                        tally.record_new_entry();
                        progress.report(&CrawlProgress::month(
                            &label,
                            tally.total_entries(),
                            tally.month_entries(),
                        ));
                    }
                    Ok(InsertOutcome::Duplicate(id)) => {
                        tracing::debug!(
                            "Entry already stored as {}: {} on {}",
                            id,
                            record.title,
                            record.date
                        );
                    }
                    Err(e) => {
                        tracing::error!("Error inserting event {}: {}", record.source_url, e);
                    }
                }
            }
        }

        if let Err(e) = tally.finish() {
            tracing::error!("Failed to complete crawl state: {}", e);
        }
        progress.report(&CrawlProgress::complete(tally.total_entries()));

        tracing::info!(
            "Scraping complete. Total entries: {} ({} months, {} failed)",
            tally.total_entries(),
            tally.months_visited(),
            tally.failed_months().len()
        );

        CrawlSummary {
            months_visited: tally.months_visited(),
            total_entries: tally.total_entries(),
            failed_months: tally.failed_months().to_vec(),
        }
    }

    /// Fetches and parses one month's listing page
    async fn month_candidates(
        &self,
        month_start: NaiveDate,
    ) -> Result<Vec<EventRecord>, CalendarError> {
        let (year, month) = (month_start.year(), month_start.month());
        let url = month_url(&self.site, year, month)?;

        tracing::debug!("Fetching listing for {}-{:02}: {}", year, month, url);
        let html = self.fetcher.fetch_page(url.as_str()).await?;

        Ok(self.parser.parse_month(&html, year, month))
    }

    fn init_storage(&self) -> StorageResult<()> {
        lock(&self.storage)?.init()
    }

    fn store(&self, record: &EventRecord) -> StorageResult<InsertOutcome> {
        lock(&self.storage)?.insert_entry(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_month() {
        let months = month_starts(date(2025, 9, 1), date(2025, 9, 30));
        assert_eq!(months, vec![date(2025, 9, 1)]);
    }

    #[test]
    fn test_partial_months_each_counted_once() {
        let months = month_starts(date(2025, 9, 1), date(2025, 10, 15));
        assert_eq!(months, vec![date(2025, 9, 1), date(2025, 10, 1)]);

        let months = month_starts(date(2025, 9, 30), date(2025, 10, 1));
        assert_eq!(months.len(), 2);
    }

    #[test]
    fn test_year_boundary() {
        let months = month_starts(date(2025, 11, 20), date(2026, 2, 3));
        assert_eq!(
            months,
            vec![
                date(2025, 11, 1),
                date(2025, 12, 1),
                date(2026, 1, 1),
                date(2026, 2, 1)
            ]
        );
    }

    #[test]
    fn test_month_end_start_does_not_skip() {
        // Stepping from Jan 31 by days would land in March
        let months = month_starts(date(2025, 1, 31), date(2025, 3, 1));
        assert_eq!(months.len(), 3);
        assert_eq!(months[1], date(2025, 2, 1));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(month_starts(date(2025, 10, 1), date(2025, 9, 1)).is_empty());
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(date(2025, 9, 14)), "September 2025");
    }
}
