//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::server::MAX_DESCRIPTORS;

/// Input handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Log an informational notice for keysyms with no scancode
    #[serde(default = "default_log_unmapped_keysyms")]
    pub log_unmapped_keysyms: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            log_unmapped_keysyms: default_log_unmapped_keysyms(),
        }
    }
}

fn default_log_unmapped_keysyms() -> bool {
    true
}

/// Readiness multiplexer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplexerConfig {
    /// Read descriptors accepted per subsystem per tick (1..=32)
    #[serde(default = "default_capacity")]
    pub read_capacity: usize,

    /// Write descriptors accepted per subsystem per tick (1..=32)
    #[serde(default = "default_capacity")]
    pub write_capacity: usize,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            read_capacity: default_capacity(),
            write_capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    MAX_DESCRIPTORS
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console format ("pretty", "compact", "json")
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Also write logs to this file (None = console only)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
