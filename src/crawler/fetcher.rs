//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client that looks like an ordinary browser
//! - Request timeout and bounded redirect following
//! - Retry with a pause that grows per attempt
//! - A polite delay after every successful fetch

use crate::config::FetcherConfig;
use crate::site::parse_absolute;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, DNT,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Desktop Chrome user agent; the town site blocks obvious bots
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Errors returned by [`Fetcher::fetch_page`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("URL must be absolute http(s): {url}")]
    InvalidUrl { url: String },

    #[error("Failed to fetch {url} after {attempts} attempt(s): {source}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        source: FetchFailure,
    },
}

/// Why a single attempt failed
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Builds the browser-like request headers sent with every fetch
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// Builds an HTTP client with proper configuration
///
/// Compression (gzip, brotli) is negotiated by the client itself.
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(browser_headers())
        .timeout(config.request_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Pause before retrying after the failed attempt `attempt` (0-based)
///
/// Grows linearly: two delays after the first failure, three after the
/// second, and so on.
pub fn retry_pause(polite_delay: Duration, attempt: u32) -> Duration {
    polite_delay * (attempt + 2)
}

/// Resilient page fetcher
///
/// Each call is retried independently; there is no shared failure state
/// between calls.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    polite_delay: Duration,
    max_retries: u32,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            polite_delay: config.polite_delay(),
            max_retries: config.max_retries,
        })
    }

    /// Fetches a page body using the configured retry budget
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_page_with_retries(url, self.max_retries).await
    }

    /// Fetches a page body, trying up to `max_retries` times
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Sleep the polite delay, return body |
    /// | Non-2xx status | Retry after `retry_pause` |
    /// | Timeout / connect / redirect-limit error | Retry after `retry_pause` |
    /// | Last attempt fails | `FetchError::Exhausted` with the last cause |
    ///
    /// A `max_retries` of zero still makes one attempt.
    pub async fn fetch_page_with_retries(
        &self,
        url: &str,
        max_retries: u32,
    ) -> Result<String, FetchError> {
        let target = parse_absolute(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        let attempts = max_retries.max(1);

        let mut attempt = 0;
        loop {
            tracing::debug!("Fetching: {} (attempt {}/{})", url, attempt + 1, attempts);

            match self.attempt(&target).await {
                Ok(body) => {
                    tokio::time::sleep(self.polite_delay).await;
                    return Ok(body);
                }
                Err(failure) => {
                    tracing::warn!(
                        "Error fetching {} (attempt {}/{}): {}",
                        url,
                        attempt + 1,
                        attempts,
                        failure
                    );

                    if attempt + 1 >= attempts {
                        return Err(FetchError::Exhausted {
                            url: url.to_string(),
                            attempts,
                            source: failure,
                        });
                    }

                    tokio::time::sleep(retry_pause(self.polite_delay, attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Performs one GET; only 2xx responses count as success
    async fn attempt(&self, url: &Url) -> Result<String, FetchFailure> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
