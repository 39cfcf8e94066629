use crate::state::CrawlPhase;
use crate::CalendarError;
use chrono::NaiveDate;

/// Per-crawl counters and phase
///
/// Each crawl owns its tally, so concurrent crawls never share counters.
/// `total_entries` only ever grows and counts genuinely new stored entries.
#[derive(Debug, Clone)]
pub struct CrawlTally {
    phase: CrawlPhase,

    /// New entries stored across the whole crawl
    total_entries: u64,

    /// New entries stored for the month in progress
    month_entries: u64,

    /// Months started so far
    months_visited: u32,

    /// Labels of months whose listing could not be processed
    failed_months: Vec<String>,
}

impl CrawlTally {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Idle,
            total_entries: 0,
            month_entries: 0,
            months_visited: 0,
            failed_months: Vec::new(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn total_entries(&self) -> u64 {
        self.total_entries
    }

    pub fn month_entries(&self) -> u64 {
        self.month_entries
    }

    pub fn months_visited(&self) -> u32 {
        self.months_visited
    }

    pub fn failed_months(&self) -> &[String] {
        &self.failed_months
    }

    /// Enters the month starting at `month_start` and resets the month counter
    pub fn begin_month(&mut self, month_start: NaiveDate) -> Result<(), CalendarError> {
        self.transition(CrawlPhase::Running(month_start))?;
        self.month_entries = 0;
        self.months_visited += 1;
        Ok(())
    }

    /// Counts one newly stored entry in the current month
    pub fn record_new_entry(&mut self) {
        self.month_entries += 1;
        self.total_entries += 1;
    }

    /// Remembers that a month's listing failed
    pub fn record_month_failure(&mut self, label: impl Into<String>) {
        self.failed_months.push(label.into());
    }

    /// Marks the crawl complete
    pub fn finish(&mut self) -> Result<(), CalendarError> {
        self.transition(CrawlPhase::Complete)
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CalendarError> {
        if !self.phase.can_transition_to(&next) {
            return Err(CalendarError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}

impl Default for CrawlTally {
    fn default() -> Self {
        Self::new()
    }
}
