//! Crawl phase definitions
//!
//! A crawl moves `Idle → Running(month) → Running(next month) → … → Complete`.
//! There is no failed phase: month and entry errors are absorbed on the way.
use chrono::NaiveDate;
use std::fmt;

/// Where a single crawl currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Created but no month started yet
    Idle,

    /// Processing the month starting at the given first day
    Running(NaiveDate),

    /// All months visited
    Complete,
}

impl CrawlPhase {
    /// Checks whether moving to `next` is a legal step
    ///
    /// Months only move forward; `Complete` may follow `Idle` when the range
    /// covers no month at all.
    pub fn can_transition_to(&self, next: &CrawlPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Running(_)) => true,
            (Self::Idle, Self::Complete) => true,
            (Self::Running(current), Self::Running(following)) => following > current,
            (Self::Running(_), Self::Complete) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running(month) => write!(f, "running {}", month.format("%Y-%m")),
            Self::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_forward_transitions() {
        assert!(CrawlPhase::Idle.can_transition_to(&CrawlPhase::Running(month(2025, 9))));
        assert!(CrawlPhase::Running(month(2025, 9))
            .can_transition_to(&CrawlPhase::Running(month(2025, 10))));
        assert!(CrawlPhase::Running(month(2025, 12))
            .can_transition_to(&CrawlPhase::Running(month(2026, 1))));
        assert!(CrawlPhase::Running(month(2025, 10)).can_transition_to(&CrawlPhase::Complete));
        assert!(CrawlPhase::Idle.can_transition_to(&CrawlPhase::Complete));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!CrawlPhase::Running(month(2025, 10))
            .can_transition_to(&CrawlPhase::Running(month(2025, 10))));
        assert!(!CrawlPhase::Running(month(2025, 10))
            .can_transition_to(&CrawlPhase::Running(month(2025, 9))));
        assert!(!CrawlPhase::Complete.can_transition_to(&CrawlPhase::Running(month(2025, 9))));
        assert!(!CrawlPhase::Running(month(2025, 9)).can_transition_to(&CrawlPhase::Idle));
        assert!(!CrawlPhase::Complete.can_transition_to(&CrawlPhase::Complete));
    }

    #[test]
    fn test_display() {
        assert_eq!(CrawlPhase::Idle.to_string(), "idle");
        assert_eq!(CrawlPhase::Running(month(2025, 9)).to_string(), "running 2025-09");
        assert_eq!(CrawlPhase::Complete.to_string(), "complete");
    }
}
