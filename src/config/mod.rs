//! Configuration module for Catalog-Metrics
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and overlaying InfluxDB connection settings from the environment.
//!
//! # Example
//!
//! ```no_run
//! use catalog_metrics::config::resolve_config;
//! use std::path::Path;
//!
//! let path = Path::new("catalog-metrics.toml");
//! let (config, _hash) = resolve_config(Some(path), |key| std::env::var(key).ok()).unwrap();
//! println!("Seed page: {}", config.seed_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, InfluxConfig, SourceConfig, DEFAULT_BASE_URL};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, read_config, resolve_config, ENV_DATABASE,
    ENV_MEASUREMENT, ENV_PASSWORD, ENV_PORT, ENV_SERVER, ENV_USER,
};
pub use validation::validate;
