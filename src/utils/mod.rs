//! Logging and Operator-Facing Errors
//!
//! # Logging
//!
//! [`init_logging`] installs the process-wide `tracing` subscriber from the
//! `[logging]` configuration section:
//!
//! ```no_run
//! use lamco_rdp_gateway::config::Config;
//! use lamco_rdp_gateway::utils::init_logging;
//!
//! let config = Config::load("gateway.toml")?;
//! let _guard = init_logging(&config.logging)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Error Formatting
//!
//! [`format_user_error`] renders a fatal error with troubleshooting hints.
//! Multiplexer failures are recognized anywhere in an `anyhow` chain and
//! explained by the tick phase that failed. [`format_tick_error`] renders a
//! bare [`MultiplexError`](crate::server::MultiplexError) the same way; the
//! session driver logs it when a run ends on a fatal tick.

pub mod errors;
pub mod logging;

pub use errors::{format_tick_error, format_user_error};
pub use logging::init_logging;
