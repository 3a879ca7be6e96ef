use crate::config::types::{Config, InfluxConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on `max-retries`; each retry may sleep for a full interval
const MAX_RETRIES_LIMIT: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_seed_url(&config.seed_url())?;
    validate_influx_config(&config.influxdb)?;
    Ok(())
}

/// Validates source API configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    if config.repository.trim().is_empty() {
        return Err(ConfigError::Validation(
            "repository cannot be empty".to_string(),
        ));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_retries must be at most {}, got {}",
            MAX_RETRIES_LIMIT, config.max_retries
        )));
    }

    Ok(())
}

/// The seed must be an absolute http(s) URL; later pages come verbatim from the API
fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    Ok(())
}

/// Validates InfluxDB connection configuration
fn validate_influx_config(config: &InfluxConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "influxdb host is required".to_string(),
        ));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation(
            "influxdb port is required".to_string(),
        ));
    }

    validate_store_address(config)?;

    if config.database.is_empty() {
        return Err(ConfigError::Validation(
            "influxdb database cannot be empty".to_string(),
        ));
    }

    if config.measurement.is_empty() {
        return Err(ConfigError::Validation(
            "influxdb measurement cannot be empty".to_string(),
        ));
    }

    if config.username.is_some() != config.password.is_some() {
        return Err(ConfigError::Validation(
            "influxdb username and password must be set together".to_string(),
        ));
    }

    Ok(())
}

/// `http://host:port` must parse back to exactly the configured host and port
fn validate_store_address(config: &InfluxConfig) -> Result<(), ConfigError> {
    let endpoint = config.endpoint();
    let invalid = |reason: &str| {
        ConfigError::InvalidUrl(format!(
            "Invalid influxdb host '{}': {}",
            config.host, reason
        ))
    };

    let url = Url::parse(&endpoint).map_err(|e| invalid(&e.to_string()))?;

    let host_matches = url
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(&config.url_host()));
    if !host_matches {
        return Err(invalid("expected a bare host name or address"));
    }

    if url.port_or_known_default() != Some(config.port) {
        return Err(invalid("port must be set with the port key"));
    }

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not contain a path"));
    }

    Ok(())
}
