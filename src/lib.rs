//! # lamco-rdp-gateway
//!
//! Input bridge for an RDP gateway session.
//!
//! A display-protocol client reports pointer state as a button bitmask and
//! keys as keysyms. An RDP stack expects edge events (button down/up, wheel
//! rotation) and XT scancodes. This crate sits between the two and also
//! drives the RDP stack's socket processing.
//!
//! # Architecture
//!
//! ```text
//! lamco-rdp-gateway
//!   ├─> Input Bridge (per session)
//!   │     ├─> Button State Translator (mask deltas → press/release/wheel)
//!   │     └─> Key Symbol Resolver     (keysym → scancode, injected keymap)
//!   └─> Readiness Multiplexer (per scheduler tick)
//!         ├─> primary subsystem descriptors   ┐
//!         ├─> channel subsystem descriptors   ├─> poll() → process both
//!         └─> Session Driver (reference loop) ┘
//! ```
//!
//! # Data Flow
//!
//! **Input Path:** Client → Input Bridge → [`input::RemoteInput`] → RDP stack
//!
//! **I/O Path:** Scheduler → [`server::ReadinessMultiplexer::tick`] →
//! [`server::ReadinessSource`] (primary, then channels)

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Gateway configuration
pub mod config;

/// Pointer and keyboard translation
pub mod input;

/// Readiness multiplexing and the session driver loop
pub mod server;

/// Logging setup and operator-facing error formatting
pub mod utils;
