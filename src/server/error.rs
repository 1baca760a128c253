//! Multiplexer Error Types
//!
//! Every variant is fatal for the session: the driving loop stops ticking
//! and the owner tears the connection down. Interrupted waits never surface
//! here.

use nix::errno::Errno;
use thiserror::Error;

use crate::server::descriptors::Direction;

/// Error reported by a descriptor-producing subsystem
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for multiplexer operations
pub type Result<T> = std::result::Result<T, MultiplexError>;

/// Fatal tick failure
#[derive(Error, Debug)]
pub enum MultiplexError {
    /// A subsystem failed to report its descriptors
    #[error("Unable to read {source_name} file descriptors: {cause}")]
    DescriptorGather {
        /// Subsystem name
        source_name: String,
        /// Underlying failure
        #[source]
        cause: SourceError,
    },

    /// A subsystem reported more descriptors than its set holds
    #[error("Too many {source_name} {direction} file descriptors (capacity {capacity})")]
    DescriptorOverflow {
        /// Subsystem name
        source_name: String,
        /// Direction that overflowed
        direction: Direction,
        /// Capacity of that direction
        capacity: usize,
    },

    /// No subsystem reported any descriptor
    #[error("No file descriptors")]
    NoTransport,

    /// The readiness wait failed with a non-transient error
    #[error("Error waiting for file descriptor: {0}")]
    WaitFailed(#[source] Errno),

    /// A subsystem failed while processing readiness
    #[error("Error handling {source_name} file descriptors: {cause}")]
    Processing {
        /// Subsystem name
        source_name: String,
        /// Underlying failure
        #[source]
        cause: SourceError,
    },
}

/// Tick phase an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Collecting descriptors from subsystems
    Gather,
    /// Blocking readiness wait
    Wait,
    /// Subsystem readiness processing
    Process,
}

impl MultiplexError {
    /// Phase the failure happened in
    pub fn phase(&self) -> TickPhase {
        match self {
            MultiplexError::DescriptorGather { .. }
            | MultiplexError::DescriptorOverflow { .. }
            | MultiplexError::NoTransport => TickPhase::Gather,
            MultiplexError::WaitFailed(_) => TickPhase::Wait,
            MultiplexError::Processing { .. } => TickPhase::Process,
        }
    }

    /// Name of the subsystem at fault, if a single one is
    pub fn source_name(&self) -> Option<&str> {
        match self {
            MultiplexError::DescriptorGather { source_name, .. }
            | MultiplexError::DescriptorOverflow { source_name, .. }
            | MultiplexError::Processing { source_name, .. } => Some(source_name),
            MultiplexError::NoTransport | MultiplexError::WaitFailed(_) => None,
        }
    }
}
