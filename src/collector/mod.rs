//! Collector module for the pagination-driven ingest
//!
//! This module contains the core collection logic, including:
//! - HTTP page fetching with bounded retry
//! - The pagination walk that transforms and writes each page

mod coordinator;
mod fetcher;

pub use coordinator::{Collector, RunSummary};
pub use fetcher::{build_http_client, fetch_page, PageFetcher, RetryPolicy};

use crate::config::Config;
use crate::Result;

/// Runs a complete collection
///
/// This is the main entry point. It will:
/// 1. Build the HTTP clients for the source API and the store
/// 2. Fetch the seed page
/// 3. Write each page's points as one batch
/// 4. Follow `next` links until the last page
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every page was fetched and written
/// * `Err(CollectorError)` - The run stopped at the first unrecoverable error
pub async fn collect(config: &Config) -> Result<RunSummary> {
    Collector::new(config)?.run().await
}
