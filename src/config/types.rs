use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Civic-Calendar
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// Calendar site location
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root used to resolve relative event links
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Path of the monthly calendar view; the `YYYY-MM` month is appended
    #[serde(rename = "calendar-path", default = "default_calendar_path")]
    pub calendar_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            calendar_path: default_calendar_path(),
        }
    }
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum redirects followed for one request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Pause after every successful fetch (milliseconds)
    #[serde(rename = "polite-delay", default = "default_polite_delay")]
    pub polite_delay: u64,

    /// Attempts per page before giving up
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,
}

impl FetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn polite_delay(&self) -> Duration {
        Duration::from_millis(self.polite_delay)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            max_redirects: default_max_redirects(),
            polite_delay: default_polite_delay(),
            max_retries: default_max_retries(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_base_url() -> String {
    "https://www.wayland.ma.us".to_string()
}

fn default_calendar_path() -> String {
    "/calendar/month/".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_max_redirects() -> usize {
    5
}

fn default_polite_delay() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}
