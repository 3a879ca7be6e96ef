//! HTTP page fetcher
//!
//! This module handles all requests against the repository metadata API:
//! - Building the HTTP client with the collector's user agent and timeout
//! - GET + JSON decode of a single page
//! - Bounded retry with a fixed pause between attempts
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Transport error / timeout | Retry |
//! | Non-2xx status | Retry |
//! | Body is not a page | Retry |
//! | Budget exhausted | Fail the run |
//!
//! Every attempt issues a fresh GET; a body is never re-read.

use crate::source::Page;
use crate::{CollectorError, FetchError, Result};
use reqwest::Client;
use std::time::Duration;

/// Number of retries and the pause before each of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Pause before every retry (never before the first attempt)
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_retries,
            interval,
        }
    }

    /// Total attempts allowed, the first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(10))
    }
}

/// Builds an HTTP client for the metadata API
///
/// # Arguments
///
/// * `timeout` - Bound on each individual request
/// * `accept_invalid_certs` - Skip TLS certificate verification
pub fn build_http_client(
    timeout: Duration,
    accept_invalid_certs: bool,
) -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with bounded retry
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl PageFetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Replaces the retry policy, keeping the client
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches and decodes the page at `url`, retrying failed attempts
    ///
    /// `url` is requested as given. A page that decodes but carries no
    /// results and no `next` link is a valid terminal page, not a failure.
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - An attempt within the budget succeeded
    /// * `Err(CollectorError::Fetch)` - Every attempt failed; carries the last error
    pub async fn fetch(&self, url: &str) -> Result<Page> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            if attempt > 1 {
                tokio::time::sleep(self.retry.interval).await;
            }

            match fetch_page(&self.client, url).await {
                Ok(page) => return Ok(page),
                Err(error) => {
                    tracing::warn!(attempt, url, error = %error, "Failed to retrieve metadata");

                    if attempt >= max_attempts {
                        return Err(CollectorError::Fetch {
                            url: url.to_string(),
                            attempts: attempt,
                            source: error,
                        });
                    }
                }
            }
        }
    }
}

/// Performs a single GET + decode, without retry
pub async fn fetch_page(
    client: &Client,
    url: &str,
) -> std::result::Result<Page, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    let page = serde_json::from_slice(&body)?;
    Ok(page)
}
