//! Crawl progress reporting
//!
//! The coordinator pushes a [`CrawlProgress`] snapshot to a [`ProgressSink`]
//! at every logical step. Sinks must return promptly; the crawl never waits
//! on a consumer.

use tokio::sync::mpsc::UnboundedSender;

/// Label used for the final update of a crawl
pub const COMPLETE_LABEL: &str = "Complete";

/// Snapshot of a running crawl
///
/// Advisory only; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlProgress {
    /// Human-readable month label, e.g. "September 2025"
    pub current_month: String,

    /// New entries stored so far in this crawl
    pub total_entries: u64,

    /// New entries stored so far in the current month
    pub current_entries: u64,

    pub is_complete: bool,

    /// Set when the current month (or storage setup) failed
    pub error: Option<String>,
}

impl CrawlProgress {
    /// Update for a month that is in progress
    pub fn month(label: impl Into<String>, total_entries: u64, current_entries: u64) -> Self {
        Self {
            current_month: label.into(),
            total_entries,
            current_entries,
            is_complete: false,
            error: None,
        }
    }

    /// Update carrying an error for the given month
    pub fn failed(
        label: impl Into<String>,
        total_entries: u64,
        current_entries: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::month(label, total_entries, current_entries)
        }
    }

    /// The final update of a crawl
    pub fn complete(total_entries: u64) -> Self {
        Self {
            current_month: COMPLETE_LABEL.to_string(),
            total_entries,
            current_entries: total_entries,
            is_complete: true,
            error: None,
        }
    }
}

/// Receives progress updates from a crawl
///
/// Implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &CrawlProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&CrawlProgress) + Send + Sync,
{
    fn report(&self, progress: &CrawlProgress) {
        self(progress)
    }
}

impl ProgressSink for UnboundedSender<CrawlProgress> {
    fn report(&self, progress: &CrawlProgress) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.send(progress.clone());
    }
}

/// A no-op progress sink
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _progress: &CrawlProgress) {}
}

/// Writes progress to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, progress: &CrawlProgress) {
        if let Some(error) = &progress.error {
            tracing::warn!("{}: {}", progress.current_month, error);
        } else if progress.is_complete {
            tracing::info!(
                "Crawl complete: {} new entries stored",
                progress.total_entries
            );
        } else {
            tracing::info!(
                "{}: {} new this month, {} total",
                progress.current_month,
                progress.current_entries,
                progress.total_entries
            );
        }
    }
}
