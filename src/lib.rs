//! Civic-Calendar: a town meeting calendar harvester
//!
//! This crate walks a town website's monthly calendar pages, extracts the
//! government-meeting events listed there, enriches each one from its detail
//! page and stores the normalized records.

pub mod config;
pub mod crawler;
pub mod event;
pub mod output;
pub mod site;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Civic-Calendar operations
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Site error: {0}")]
    Site(#[from] SiteError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Invalid crawl transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors building URLs for the calendar site
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Result type alias for Civic-Calendar operations
pub type Result<T> = std::result::Result<T, CalendarError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for site URL operations
pub type SiteResult<T> = std::result::Result<T, SiteError>;

// Re-export commonly used types
pub use config::Config;
pub use event::{EventKey, EventRecord, StoredEntry};
pub use state::{CrawlPhase, CrawlTally};
