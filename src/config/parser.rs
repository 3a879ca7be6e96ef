use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variables recognised by [`apply_env_overrides`]
pub const ENV_SERVER: &str = "INFLUX_SERVER";
pub const ENV_PORT: &str = "INFLUX_PORT";
pub const ENV_USER: &str = "INFLUX_USER";
pub const ENV_PASSWORD: &str = "INFLUX_PWD";
pub const ENV_DATABASE: &str = "INFLUXDB_NAME";
pub const ENV_MEASUREMENT: &str = "INFLUXDB_MEASURE";

/// Reads and parses a configuration file without validating it
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Resolves the run configuration
///
/// Reads the file at `path` (when given) and hashes it, overlays the
/// environment through `lookup`, then validates the result. Without a file
/// the defaults are used and no hash is returned.
///
/// # Returns
///
/// * `Ok((Config, Option<String>))` - Validated configuration and file hash
/// * `Err(ConfigError)` - Failed to read, parse, override, or validate
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use catalog_metrics::config::resolve_config;
///
/// let (config, _hash) =
///     resolve_config(Some(Path::new("catalog-metrics.toml")), |key| std::env::var(key).ok())
///         .unwrap();
/// println!("Writing into database: {}", config.influxdb.database);
/// ```
pub fn resolve_config<F>(
    path: Option<&Path>,
    lookup: F,
) -> Result<(Config, Option<String>), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, hash) = match path {
        Some(path) => (read_config(path)?, Some(compute_config_hash(path)?)),
        None => (Config::default(), None),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate(&config)?;

    Ok((config, hash))
}

/// Overlays connection settings taken from environment variables
///
/// `lookup` resolves a variable name to its value; pass
/// `|key| std::env::var(key).ok()` for the process environment. Empty values
/// are treated as unset.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get(ENV_SERVER) {
        config.influxdb.host = host;
    }

    if let Some(port) = get(ENV_PORT) {
        config.influxdb.port = port.trim().parse().map_err(|e| {
            ConfigError::Validation(format!(
                "{} must be a port number, got '{}': {}",
                ENV_PORT, port, e
            ))
        })?;
    }

    if let Some(user) = get(ENV_USER) {
        config.influxdb.username = Some(user);
    }

    if let Some(password) = get(ENV_PASSWORD) {
        config.influxdb.password = Some(password);
    }

    if let Some(database) = get(ENV_DATABASE) {
        config.influxdb.database = database;
    }

    if let Some(measurement) = get(ENV_MEASUREMENT) {
        config.influxdb.measurement = measurement;
    }

    Ok(())
}
