//! Blocking Readiness Wait
//!
//! One wait per tick, no timeout: the session has nothing to do until a
//! socket is ready. Signal interruptions and would-block style results are
//! not failures; the caller processes its subsystems anyway.

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use tracing::trace;

use crate::server::descriptors::ReadinessSets;

/// Wait until at least one descriptor is ready
pub trait ReadinessWait {
    /// Block without timeout; returns the number of ready descriptors
    fn wait(&mut self, sets: &ReadinessSets<'_>) -> nix::Result<usize>;
}

impl<W: ReadinessWait + ?Sized> ReadinessWait for &mut W {
    fn wait(&mut self, sets: &ReadinessSets<'_>) -> nix::Result<usize> {
        (**self).wait(sets)
    }
}

/// Whether a wait error only means "look again"
///
/// EINTR (signal), EAGAIN/EWOULDBLOCK and EINPROGRESS are tolerated.
pub fn is_interruption(errno: Errno) -> bool {
    matches!(errno, Errno::EINTR | Errno::EAGAIN | Errno::EINPROGRESS)
        || errno == Errno::EWOULDBLOCK
}

/// `poll(2)` based wait
#[derive(Debug, Clone, Copy, Default)]
pub struct PollWait;

impl ReadinessWait for PollWait {
    fn wait(&mut self, sets: &ReadinessSets<'_>) -> nix::Result<usize> {
        let mut fds: Vec<PollFd<'_>> = sets
            .read()
            .iter()
            .map(|fd| PollFd::new(*fd, PollFlags::POLLIN))
            .chain(
                sets.write()
                    .iter()
                    .map(|fd| PollFd::new(*fd, PollFlags::POLLOUT)),
            )
            .collect();

        trace!(
            "poll: {} read, {} write, max fd {:?}",
            sets.read().len(),
            sets.write().len(),
            sets.max_fd()
        );

        let ready = poll(&mut fds, PollTimeout::NONE)?;
        Ok(ready.max(0) as usize)
    }
}
