//! Logging Initialization
//!
//! Installs the global `tracing` subscriber from the `[logging]` section.
//! `RUST_LOG` takes precedence over the configured level.

use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("lamco_rdp_gateway={level},warn"))
}

/// Install the global subscriber
///
/// Returns the file writer guard when `log_file` is set; keep it alive for
/// the life of the process or buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer(&config.format)];

    let guard = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            let file_layer = match config.format.as_str() {
                "json" => tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed(),
                "compact" => tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed(),
                _ => tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed(),
            };
            layers.push(file_layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn stdout_layer(format: &str) -> BoxedLayer {
    match format {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .boxed(),
        "compact" => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stdout)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stdout)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_names_crate() {
        let filter = default_filter("debug").to_string();
        assert!(filter.contains("lamco_rdp_gateway=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn test_init_logging_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "compact".to_string(),
            log_file: Some(dir.path().join("gateway.log")),
        };

        let _guard = init_logging(&config);

        // One global subscriber per process
        assert!(init_logging(&config).is_err());
        assert!(dir.path().join("gateway.log").exists());
    }

    #[test]
    fn test_init_logging_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_file: Some(dir.path().join("missing").join("gateway.log")),
            ..LoggingConfig::default()
        };

        let err = init_logging(&config).unwrap_err();
        assert!(err.to_string().contains("Failed to open log file"));
    }
}
