//! Collector coordinator - the pagination walk
//!
//! Starting at the seed URL, each page is fetched, turned into points and
//! written as one batch; then the page's `next` link is followed verbatim.
//! The walk ends successfully on the first page without a `next` link.
//!
//! Any fetch failure (after the fetcher's own retries) or write failure ends
//! the run immediately. Batches already written stay in the store and the
//! pagination position is not persisted, so recovery means re-running from
//! the seed.

use crate::collector::fetcher::{build_http_client, PageFetcher, RetryPolicy};
use crate::config::Config;
use crate::metrics::{records_to_points, InfluxWriter, Precision};
use crate::{CollectorError, Result};

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages fetched and ingested
    pub pages: usize,
    /// Points written across all pages
    pub points: usize,
}

/// Drives the fetch → transform → write cycle across all pages
#[derive(Debug, Clone)]
pub struct Collector {
    fetcher: PageFetcher,
    writer: InfluxWriter,
    seed_url: String,
    measurement: String,
    precision: Precision,
}

impl Collector {
    /// Creates a collector from a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Collector)` - HTTP clients built and store endpoint resolved
    /// * `Err(CollectorError)` - Client construction or store URL failed
    pub fn new(config: &Config) -> Result<Self> {
        let source_client = build_http_client(
            config.source.request_timeout(),
            config.source.accept_invalid_certs,
        )
        .map_err(CollectorError::Client)?;

        let store_client = build_http_client(config.source.request_timeout(), false)
            .map_err(CollectorError::Client)?;

        let retry = RetryPolicy::new(config.source.max_retries, config.source.retry_interval());

        Ok(Self {
            fetcher: PageFetcher::new(source_client, retry),
            writer: InfluxWriter::new(store_client, &config.influxdb)?,
            seed_url: config.seed_url(),
            measurement: config.influxdb.measurement.clone(),
            precision: config.influxdb.precision,
        })
    }

    /// Replaces the retry policy, e.g. to skip real sleeping
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.fetcher = self.fetcher.with_retry_policy(retry);
        self
    }

    /// Walks the pagination chain until a page has no `next` link
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!(
            "Starting collection from {} into {} ({})",
            self.seed_url,
            self.writer.database(),
            self.writer.endpoint()
        );

        let mut summary = RunSummary::default();
        let mut url = self.seed_url.clone();

        loop {
            tracing::info!("Get repository metadata with url: {}", url);
            let page = self.fetcher.fetch(&url).await?;

            tracing::debug!(
                "Page reports {} repositories, {} on this page",
                page.count,
                page.results.len()
            );
            tracing::debug!("Writing records: {:?}", page.results);

            let points = records_to_points(&page.results, &self.measurement, self.precision);
            let written = self
                .writer
                .write(&points)
                .await
                .map_err(|source| CollectorError::Write {
                    url: self.writer.endpoint().to_string(),
                    points: points.len(),
                    source,
                })?;

            summary.pages += 1;
            summary.points += written;

            match page.next_url() {
                Some(next) => url = next.to_string(),
                None => break,
            }
        }

        tracing::info!(
            "Collection completed: {} pages, {} points written",
            summary.pages,
            summary.points
        );

        Ok(summary)
    }
}
