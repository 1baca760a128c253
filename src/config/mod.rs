//! Configuration management
//!
//! Handles loading and validation of the gateway configuration from a TOML
//! file. Every section is optional; missing keys take their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::server::MAX_DESCRIPTORS;

pub mod types;

pub use types::{InputConfig, LoggingConfig, MultiplexerConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Multiplexer configuration
    #[serde(default)]
    pub multiplexer: MultiplexerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            input: InputConfig {
                log_unmapped_keysyms: true,
            },
            multiplexer: MultiplexerConfig {
                read_capacity: MAX_DESCRIPTORS,
                write_capacity: MAX_DESCRIPTORS,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                log_file: None,
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate descriptor capacities
        for (name, capacity) in [
            ("read_capacity", self.multiplexer.read_capacity),
            ("write_capacity", self.multiplexer.write_capacity),
        ] {
            if capacity == 0 || capacity > MAX_DESCRIPTORS {
                anyhow::bail!(
                    "Invalid multiplexer {}: {} (must be 1..={})",
                    name,
                    capacity,
                    MAX_DESCRIPTORS
                );
            }
        }

        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        // Validate log format
        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        Ok(())
    }
}
