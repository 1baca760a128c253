//! User-Friendly Error Formatting
//!
//! Renders fatal session errors for operators, with troubleshooting hints
//! picked from the tick phase that failed.

use std::fmt::Write;

use crate::server::{MultiplexError, TickPhase};

/// Format error for user consumption
///
/// Multiplexer failures anywhere in the chain get phase-specific hints;
/// anything else is classified by its message.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let multiplex = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<MultiplexError>());

    render(
        |output| match multiplex {
            Some(err) => format_multiplex_error(output, err),
            None => {
                let error_msg = error.to_string();
                if error_msg.contains("config") {
                    format_config_error(output);
                } else {
                    format_generic_error(output, &error_msg);
                }
            }
        },
        &format!("{:#}", error),
    )
}

/// Format a fatal tick error for user consumption
///
/// Same layout as [`format_user_error`], without wrapping the error first.
pub fn format_tick_error(error: &MultiplexError) -> String {
    // Every variant's message already embeds its cause
    render(
        |output| format_multiplex_error(output, error),
        &error.to_string(),
    )
}

fn render(body: impl FnOnce(&mut String), details: &str) -> String {
    let mut output = String::new();

    // Header
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    body(&mut output);

    // Technical details
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{}", details).ok();
    writeln!(&mut output).ok();

    // Footer
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Re-run with RUST_LOG=lamco_rdp_gateway=trace for per-tick logs"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_multiplex_error(output: &mut String, err: &MultiplexError) {
    if let MultiplexError::NoTransport = err {
        writeln!(output, "Session Has No Transport").ok();
        writeln!(output).ok();
        writeln!(
            output,
            "Neither the RDP connection nor any virtual channel reported a socket."
        )
        .ok();
        writeln!(output).ok();
        writeln!(output, "Common Causes:").ok();
        writeln!(output).ok();
        writeln!(output, "  1. The RDP server closed the connection").ok();
        writeln!(output, "     → Check the remote host's event log").ok();
        writeln!(output).ok();
        writeln!(output, "  2. The session was torn down before the loop stopped").ok();
        return;
    }

    match err.phase() {
        TickPhase::Gather => {
            writeln!(output, "Socket Collection Error").ok();
            writeln!(output).ok();
            writeln!(
                output,
                "Could not collect the sockets of the {} subsystem.",
                err.source_name().unwrap_or("session")
            )
            .ok();
            writeln!(output).ok();
            writeln!(output, "Common Causes:").ok();
            writeln!(output).ok();
            writeln!(output, "  1. Too many open virtual channels").ok();
            writeln!(
                output,
                "     → Raise [multiplexer] read_capacity/write_capacity (max 32)"
            )
            .ok();
            writeln!(output).ok();
            writeln!(output, "  2. Connection lost while collecting sockets").ok();
        }
        TickPhase::Wait => {
            writeln!(output, "Socket Wait Error").ok();
            writeln!(output).ok();
            writeln!(output, "Waiting for socket readiness failed.").ok();
            writeln!(output).ok();
            writeln!(output, "Common Causes:").ok();
            writeln!(output).ok();
            writeln!(output, "  1. A socket was closed while still registered").ok();
            writeln!(output, "  2. The process ran out of memory or descriptors").ok();
            writeln!(output, "     → Check: ulimit -n").ok();
        }
        TickPhase::Process => {
            writeln!(output, "Session Processing Error").ok();
            writeln!(output).ok();
            writeln!(
                output,
                "The {} subsystem failed while handling received data.",
                err.source_name().unwrap_or("session")
            )
            .ok();
            writeln!(output).ok();
            writeln!(output, "Common Causes:").ok();
            writeln!(output).ok();
            writeln!(output, "  1. The RDP server disconnected the session").ok();
            writeln!(output, "  2. Network connection dropped").ok();
        }
    }
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The configuration file is invalid or missing.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. TOML syntax error").ok();
    writeln!(output, "     → Check for missing quotes or brackets").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Value out of range").ok();
    writeln!(output, "     → Capacities must be 1..=32").ok();
    writeln!(
        output,
        "     → level: trace|debug|info|warn|error, format: pretty|compact|json"
    )
    .ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "An error occurred:").ok();
    writeln!(output).ok();
    writeln!(output, "  {}", error).ok();
}
