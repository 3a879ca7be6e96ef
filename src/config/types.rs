use crate::metrics::Precision;
use serde::Deserialize;
use std::net::Ipv6Addr;
use std::time::Duration;

/// Default repository listing endpoint on Docker Hub
pub const DEFAULT_BASE_URL: &str = "https://hub.docker.com/v2/repositories/";

/// Main configuration structure for Catalog-Metrics
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub influxdb: InfluxConfig,
}

impl Config {
    /// The first page URL: `base-url` and `repository` joined by a single `/`
    pub fn seed_url(&self) -> String {
        format!(
            "{}/{}",
            self.source.base_url.trim_end_matches('/'),
            self.source.repository.trim_start_matches('/')
        )
    }
}

/// Repository metadata API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Listing endpoint the repository name is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Repository (namespace) whose images are collected
    pub repository: String,

    /// Per-request HTTP timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Retries after the first failed attempt of a page fetch
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed pause before each retry (seconds)
    #[serde(rename = "retry-interval")]
    pub retry_interval: u64,

    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            repository: "ranchercharts".to_string(),
            request_timeout: 10,
            max_retries: 3,
            retry_interval: 10,
            accept_invalid_certs: true,
        }
    }
}

/// InfluxDB connection and target configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    /// Server host name; required
    pub host: String,

    /// Server HTTP port; required
    pub port: u16,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Target database
    pub database: String,

    /// Measurement every point is written under
    pub measurement: String,

    /// Timestamp precision of written points
    pub precision: Precision,
}

impl InfluxConfig {
    /// Host as it appears in a URL; IPv6 literals are bracketed
    pub fn url_host(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// Store base address, `http://host:port`, without credentials
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.url_host(), self.port)
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            username: None,
            password: None,
            database: "catalog".to_string(),
            measurement: "repositories".to_string(),
            precision: Precision::Hours,
        }
    }
}
