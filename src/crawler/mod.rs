//! Crawler module for calendar harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Month listing parsing with fallback strategies
//! - Best-effort detail page enrichment
//! - Progress reporting
//! - Overall crawl coordination

mod coordinator;
mod enricher;
mod fetcher;
mod parser;
mod progress;

pub use coordinator::{month_label, month_starts, Coordinator, CrawlSummary};
pub use enricher::{apply_details, extract_details, Enricher, EventDetails};
pub use fetcher::{
    browser_headers, build_http_client, retry_pause, FetchError, FetchFailure, Fetcher,
    BROWSER_USER_AGENT,
};
pub use parser::{
    candidate_from_link, parse_month, split_time, DateBoxLocator, DayCell, DayLocator,
    MonthParser, TableCellLocator,
};
pub use progress::{CrawlProgress, LogProgress, NullProgress, ProgressSink, COMPLETE_LABEL};

use crate::storage::Storage;
use crate::CalendarError;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A validated crawl date range (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CrawlRequest {
    /// Creates a request, rejecting ranges where `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a request from two `YYYY-MM-DD` strings
    ///
    /// # Examples
    ///
    /// ```
    /// use civic_calendar::crawler::CrawlRequest;
    ///
    /// assert!(CrawlRequest::parse("2025-09-01", "2025-10-31").is_ok());
    /// assert!(CrawlRequest::parse("2025-10-31", "2025-09-01").is_err());
    /// assert!(CrawlRequest::parse("September", "2025-10-31").is_err());
    /// ```
    pub fn parse(start: &str, end: &str) -> Result<Self, CalendarError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| CalendarError::InvalidDate {
        value: value.to_string(),
    })
}

/// Starts a crawl on a detached task and returns immediately
///
/// The crawl's lifetime is independent of the caller; dropping the handle
/// does not stop it. There is no cancellation.
///
/// # Arguments
///
/// * `coordinator` - Shared coordinator to run the crawl with
/// * `request` - Validated date range
/// * `progress` - Sink receiving progress updates
///
/// # Returns
///
/// Handle resolving to the crawl summary
pub fn spawn_crawl<S>(
    coordinator: Arc<Coordinator<S>>,
    request: CrawlRequest,
    progress: Arc<dyn ProgressSink>,
) -> JoinHandle<CrawlSummary>
where
    S: Storage + Send + 'static,
{
    tracing::info!(
        "Crawl scheduled for {} to {}",
        request.start,
        request.end
    );

    tokio::spawn(async move {
        coordinator
            .run(request.start, request.end, progress.as_ref())
            .await
    })
}
