//! Session I/O Scheduling
//!
//! Each scheduler iteration of a gateway session runs one
//! [`ReadinessMultiplexer::tick`]: the RDP core connection and the virtual
//! channel manager report their sockets, the gateway blocks until one of
//! them is ready, then both subsystems process their pending work.
//!
//! # Architecture
//!
//! ```text
//! SessionDriver (loop, stop flag)
//!   └─> ReadinessMultiplexer::tick
//!         ├─> ReadinessSource (primary: RDP core)
//!         ├─> ReadinessSource (auxiliary: virtual channels)
//!         └─> ReadinessWait (poll, no timeout)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lamco_rdp_gateway::server::{ReadinessMultiplexer, ReadinessSource, SessionDriver};
//!
//! fn serve(rdp: &mut dyn ReadinessSource, channels: &mut dyn ReadinessSource) {
//!     let mut driver = SessionDriver::new(ReadinessMultiplexer::new());
//!     let report = driver.run(rdp, channels);
//!     if let Some(err) = report.error {
//!         eprintln!("session ended: {err}");
//!     }
//! }
//! ```
//!
//! # Failure Model
//!
//! Every [`MultiplexError`] is fatal for the session. Interrupted waits
//! (EINTR, EAGAIN, EINPROGRESS) are not errors: both subsystems still run.

pub mod descriptors;
pub mod driver;
pub mod error;
pub mod multiplexer;
pub mod wait;

pub use descriptors::{CapacityExceeded, DescriptorSet, Direction, ReadinessSets, MAX_DESCRIPTORS};
pub use driver::{DriverReport, SessionDriver};
pub use error::{MultiplexError, SourceError, TickPhase};
pub use multiplexer::{ReadinessMultiplexer, ReadinessSource, TickOutcome};
pub use wait::{is_interruption, PollWait, ReadinessWait};
