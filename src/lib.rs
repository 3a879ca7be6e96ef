//! Catalog-Metrics: repository statistics collector
//!
//! This crate walks a paginated repository metadata API (Docker Hub by default),
//! turns every repository record into a time-series point and writes each page
//! of points into an InfluxDB database.

pub mod collector;
pub mod config;
pub mod metrics;
pub mod source;

use thiserror::Error;

/// Main error type for Catalog-Metrics operations
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch {url} after {attempts} attempts: {source}")]
    Fetch {
        url: String,
        attempts: u32,
        source: FetchError,
    },

    #[error("Failed to write {points} points to {url}: {source}")]
    Write {
        url: String,
        points: usize,
        source: WriteError,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
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

/// Errors from a single page fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("failed to decode page: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from a metrics store write
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected batch with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result type alias for Catalog-Metrics operations
pub type Result<T> = std::result::Result<T, CollectorError>;

// Re-export commonly used types
pub use collector::{collect, Collector, RunSummary};
pub use config::Config;
pub use metrics::{FieldValue, Point, Precision};
pub use source::{Page, Record};
