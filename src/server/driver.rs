//! Session Driver Loop
//!
//! Reference implementation of the external loop: tick until a fatal error
//! or until asked to stop. The stop flag is checked between ticks, so a stop
//! request takes effect once the current wait returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::server::error::MultiplexError;
use crate::server::multiplexer::{ReadinessMultiplexer, ReadinessSource, TickOutcome};
use crate::server::wait::{PollWait, ReadinessWait};
use crate::utils::format_tick_error;

/// Why and after how much work a driver run ended
#[derive(Debug, Default)]
pub struct DriverReport {
    /// Ticks attempted (including the failing one)
    pub ticks: u64,
    /// Ticks whose wait was interrupted
    pub interrupted_waits: u64,
    /// Fatal error that ended the run, `None` if stopped on request
    pub error: Option<MultiplexError>,
}

impl DriverReport {
    /// Run ended on request rather than on a fatal error
    pub fn stopped_cleanly(&self) -> bool {
        self.error.is_none()
    }

    /// Operator-facing rendering of the fatal error, if any
    pub fn render_error(&self) -> Option<String> {
        self.error.as_ref().map(format_tick_error)
    }
}

/// Drives a [`ReadinessMultiplexer`] for the life of a session
#[derive(Debug)]
pub struct SessionDriver<W = PollWait> {
    multiplexer: ReadinessMultiplexer<W>,
    stop: Arc<AtomicBool>,
}

impl<W: ReadinessWait> SessionDriver<W> {
    /// Create a driver around a multiplexer
    pub fn new(multiplexer: ReadinessMultiplexer<W>) -> Self {
        Self {
            multiplexer,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends [`SessionDriver::run`] before its next tick
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Underlying multiplexer
    pub fn multiplexer(&self) -> &ReadinessMultiplexer<W> {
        &self.multiplexer
    }

    /// Tick until a fatal error or a stop request
    pub fn run<P, A>(&mut self, primary: &mut P, auxiliary: &mut A) -> DriverReport
    where
        P: ReadinessSource + ?Sized,
        A: ReadinessSource + ?Sized,
    {
        info!(
            "🚀 Session driver started ({} + {})",
            primary.name(),
            auxiliary.name()
        );

        let mut report = DriverReport::default();

        while !self.stop.load(Ordering::Acquire) {
            report.ticks += 1;

            match self.multiplexer.tick(primary, auxiliary) {
                Ok(TickOutcome::Ready(_)) => {}
                Ok(TickOutcome::Interrupted(_)) => report.interrupted_waits += 1,
                Err(e) => {
                    report.error = Some(e);
                    warn!(
                        "Session driver stopping after fatal tick:\n{}",
                        report.render_error().unwrap_or_default()
                    );
                    break;
                }
            }
        }

        info!(
            "📊 Session driver final stats: ticks={}, interrupted={}, clean={}",
            report.ticks,
            report.interrupted_waits,
            report.stopped_cleanly()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::descriptors::{DescriptorSet, ReadinessSets};
    use crate::server::error::SourceError;
    use nix::errno::Errno;
    use std::os::fd::AsFd;
    use std::os::unix::net::UnixStream;
    use tracing_test::traced_test;

    struct CountingWait {
        interrupt_every: usize,
        calls: usize,
    }

    impl ReadinessWait for CountingWait {
        fn wait(&mut self, _sets: &ReadinessSets<'_>) -> nix::Result<usize> {
            self.calls += 1;
            if self.interrupt_every != 0 && self.calls % self.interrupt_every == 0 {
                return Err(Errno::EINTR);
            }
            Ok(1)
        }
    }

    /// Source that raises the stop flag or fails after a number of ticks
    struct Countdown {
        socket: UnixStream,
        remaining: usize,
        stop: Option<Arc<AtomicBool>>,
    }

    impl ReadinessSource for Countdown {
        fn name(&self) -> &str {
            "countdown"
        }

        fn collect_descriptors<'fd>(
            &'fd self,
            descriptors: &mut DescriptorSet<'fd>,
        ) -> Result<(), SourceError> {
            descriptors.add_read(self.socket.as_fd())?;
            Ok(())
        }

        fn process_readiness(&mut self) -> Result<(), SourceError> {
            self.remaining -= 1;
            if self.remaining == 0 {
                match &self.stop {
                    Some(stop) => stop.store(true, Ordering::Release),
                    None => return Err("connection reset".into()),
                }
            }
            Ok(())
        }
    }

    struct Idle;

    impl ReadinessSource for Idle {
        fn name(&self) -> &str {
            "idle"
        }

        fn collect_descriptors<'fd>(
            &'fd self,
            _descriptors: &mut DescriptorSet<'fd>,
        ) -> Result<(), SourceError> {
            Ok(())
        }

        fn process_readiness(&mut self) -> Result<(), SourceError> {
            Ok(())
        }
    }

    fn socket() -> UnixStream {
        UnixStream::pair().unwrap().0
    }

    #[test]
    fn test_driver_stops_on_request() {
        let mut driver = SessionDriver::new(ReadinessMultiplexer::with_waiter(CountingWait {
            interrupt_every: 2,
            calls: 0,
        }));
        let mut primary = Countdown {
            socket: socket(),
            remaining: 5,
            stop: Some(driver.stop_handle()),
        };

        let report = driver.run(&mut primary, &mut Idle);

        assert!(report.stopped_cleanly());
        assert_eq!(report.ticks, 5);
        assert_eq!(report.interrupted_waits, 2);
    }

    #[test]
    #[traced_test]
    fn test_driver_stops_on_fatal_error() {
        let mut driver = SessionDriver::new(ReadinessMultiplexer::with_waiter(CountingWait {
            interrupt_every: 0,
            calls: 0,
        }));
        let mut primary = Countdown {
            socket: socket(),
            remaining: 3,
            stop: None,
        };

        let report = driver.run(&mut primary, &mut Idle);

        assert!(!report.stopped_cleanly());
        assert_eq!(report.ticks, 3);
        assert!(matches!(
            report.error,
            Some(MultiplexError::Processing { .. })
        ));

        let rendered = report.render_error().unwrap();
        assert!(rendered.contains("Session Processing Error"));
        assert!(rendered.contains("Error handling countdown file descriptors: connection reset"));
        assert!(logs_contain("Session driver stopping after fatal tick"));
    }

    #[test]
    fn test_driver_does_not_tick_when_already_stopped() {
        let mut driver = SessionDriver::new(ReadinessMultiplexer::with_waiter(CountingWait {
            interrupt_every: 0,
            calls: 0,
        }));
        driver.stop_handle().store(true, Ordering::Release);

        let report = driver.run(&mut Idle, &mut Idle);

        assert_eq!(report.ticks, 0);
        assert!(report.stopped_cleanly());
        assert_eq!(report.render_error(), None);
        assert_eq!(driver.multiplexer().waiter().calls, 0);
    }
}
