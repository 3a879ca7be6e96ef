//! Catalog-Metrics main entry point
//!
//! This is the command-line interface for the repository statistics collector.

use anyhow::Context;
use catalog_metrics::collector::collect;
use catalog_metrics::config::{resolve_config, Config};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Catalog-Metrics: collects image repository metrics into InfluxDB
///
/// Walks every page of the repository listing API and writes one point per
/// repository. InfluxDB connection settings may come from the config file or
/// from INFLUX_SERVER, INFLUX_PORT, INFLUX_USER, INFLUX_PWD, INFLUXDB_NAME and
/// INFLUXDB_MEASURE.
#[derive(Parser, Debug)]
#[command(name = "catalog-metrics")]
#[command(version)]
#[command(about = "Helps collecting repository catalog metrics", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect repository metrics from Docker Hub
    #[command(visible_alias = "hub")]
    Dockerhub,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    let result = match cli.command {
        Command::Dockerhub => handle_dockerhub(cli.config.as_deref()).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber
fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("catalog_metrics=debug,info")
    } else {
        EnvFilter::new("catalog_metrics=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves configuration from file and environment, then validates it
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let (config, hash) = resolve_config(path, |key| std::env::var(key).ok())
        .context("invalid configuration")?;

    if let Some(hash) = hash {
        tracing::info!("Configuration loaded (hash: {})", hash);
    }

    Ok(config)
}

/// Handles the `dockerhub` command: runs the full collection
async fn handle_dockerhub(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_configuration(config_path)?;

    let summary = collect(&config).await.context("collection failed")?;

    tracing::info!(
        "Collected {} repositories across {} pages",
        summary.points,
        summary.pages
    );

    Ok(())
}
