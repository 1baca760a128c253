//! Readiness Multiplexer
//!
//! Drives the RDP stack's socket handling once per scheduler iteration.
//!
//! # Tick
//!
//! ```text
//! primary.collect_descriptors()   ──┐  (32 read / 32 write each)
//! auxiliary.collect_descriptors() ──┤
//!                                   ↓
//!                        ReadinessSets (merged)
//!                                   ↓  empty → NoTransport
//!                        wait (no timeout)
//!                                   ↓  EINTR/EAGAIN/EINPROGRESS → continue
//! primary.process_readiness()       ↓
//! auxiliary.process_readiness()     ↓
//!                                 success
//! ```
//!
//! Descriptors are recomputed every tick because subsystems open and close
//! channels while the session runs.

use tracing::{debug, error, trace};

use crate::config::MultiplexerConfig;
use crate::server::descriptors::{CapacityExceeded, DescriptorSet, ReadinessSets, MAX_DESCRIPTORS};
use crate::server::error::{MultiplexError, Result, SourceError};
use crate::server::wait::{is_interruption, PollWait, ReadinessWait};

/// A subsystem that owns sockets and processes them when ready
///
/// For an RDP session these are the core connection and the virtual
/// channel manager.
pub trait ReadinessSource {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Add every descriptor this subsystem wants watched
    ///
    /// Adding past the set's capacity fails with [`CapacityExceeded`];
    /// propagate it with `?`.
    fn collect_descriptors<'fd>(
        &'fd self,
        descriptors: &mut DescriptorSet<'fd>,
    ) -> std::result::Result<(), SourceError>;

    /// Handle whatever became ready
    fn process_readiness(&mut self) -> std::result::Result<(), SourceError>;
}

/// Result of a successful tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The wait returned with this many ready descriptors
    Ready(usize),
    /// The wait was interrupted; subsystems were processed anyway
    Interrupted(nix::errno::Errno),
}

/// Readiness multiplexer over a primary and an auxiliary subsystem
#[derive(Debug)]
pub struct ReadinessMultiplexer<W = PollWait> {
    waiter: W,
    read_capacity: usize,
    write_capacity: usize,
}

impl ReadinessMultiplexer<PollWait> {
    /// Multiplexer using `poll(2)` and full descriptor capacity
    pub fn new() -> Self {
        Self::with_waiter(PollWait)
    }

    /// Multiplexer using `poll(2)` and the configured capacities
    pub fn from_config(config: &MultiplexerConfig) -> Self {
        Self::new().with_capacity(config.read_capacity, config.write_capacity)
    }
}

impl Default for ReadinessMultiplexer<PollWait> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: ReadinessWait> ReadinessMultiplexer<W> {
    /// Multiplexer with a custom wait primitive
    pub fn with_waiter(waiter: W) -> Self {
        Self {
            waiter,
            read_capacity: MAX_DESCRIPTORS,
            write_capacity: MAX_DESCRIPTORS,
        }
    }

    /// Lower the per-subsystem capacities (never above [`MAX_DESCRIPTORS`])
    pub fn with_capacity(mut self, read_capacity: usize, write_capacity: usize) -> Self {
        self.read_capacity = read_capacity.min(MAX_DESCRIPTORS);
        self.write_capacity = write_capacity.min(MAX_DESCRIPTORS);
        self
    }

    /// Per-subsystem `(read, write)` capacities
    pub fn capacity(&self) -> (usize, usize) {
        (self.read_capacity, self.write_capacity)
    }

    /// Wait primitive
    pub fn waiter(&self) -> &W {
        &self.waiter
    }

    /// Run one gather → wait → process cycle
    pub fn tick<P, A>(&mut self, primary: &mut P, auxiliary: &mut A) -> Result<TickOutcome>
    where
        P: ReadinessSource + ?Sized,
        A: ReadinessSource + ?Sized,
    {
        let outcome = {
            let primary_set = self.gather(&*primary)?;
            let auxiliary_set = self.gather(&*auxiliary)?;
            let sets = ReadinessSets::aggregate([&primary_set, &auxiliary_set]);

            if sets.is_empty() {
                error!("No file descriptors");
                return Err(MultiplexError::NoTransport);
            }

            trace!(
                "Waiting on {} descriptors ({} from {}, {} from {}), max fd {:?}",
                sets.len(),
                primary_set.len(),
                primary.name(),
                auxiliary_set.len(),
                auxiliary.name(),
                sets.max_fd()
            );

            match self.waiter.wait(&sets) {
                Ok(ready) => TickOutcome::Ready(ready),
                Err(errno) if is_interruption(errno) => {
                    debug!("Readiness wait interrupted ({}), processing anyway", errno);
                    TickOutcome::Interrupted(errno)
                }
                Err(errno) => {
                    error!("Error waiting for file descriptor: {}", errno);
                    return Err(MultiplexError::WaitFailed(errno));
                }
            }
        };

        Self::process(primary)?;
        Self::process(auxiliary)?;

        Ok(outcome)
    }

    fn gather<'fd, S>(&self, source: &'fd S) -> Result<DescriptorSet<'fd>>
    where
        S: ReadinessSource + ?Sized,
    {
        let mut set = DescriptorSet::with_capacity(self.read_capacity, self.write_capacity);
        let collected = source.collect_descriptors(&mut set);

        // A rejected add is fatal even if the source discarded the error
        let err = match (set.overflow(), collected) {
            (Some(overflow), _) => MultiplexError::DescriptorOverflow {
                source_name: source.name().to_string(),
                direction: overflow.direction,
                capacity: overflow.capacity,
            },
            (None, Ok(())) => return Ok(set),
            (None, Err(cause)) => match cause.downcast::<CapacityExceeded>() {
                Ok(overflow) => MultiplexError::DescriptorOverflow {
                    source_name: source.name().to_string(),
                    direction: overflow.direction,
                    capacity: overflow.capacity,
                },
                Err(cause) => MultiplexError::DescriptorGather {
                    source_name: source.name().to_string(),
                    cause,
                },
            },
        };

        error!("{}", err);
        Err(err)
    }

    fn process<S>(source: &mut S) -> Result<()>
    where
        S: ReadinessSource + ?Sized,
    {
        source.process_readiness().map_err(|cause| {
            let err = MultiplexError::Processing {
                source_name: source.name().to_string(),
                cause,
            };
            error!("{}", err);
            err
        })
    }
}
