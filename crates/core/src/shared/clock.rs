use std::time::{Duration, Instant};

use super::stop_signal::StopSignal;

/// Source of monotonic time and of interruptible waiting.
///
/// The monitor never calls `Instant::now` or `thread::sleep` directly, so
/// its timing policy can be driven by a manual clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Waits for `duration` or until `stop` is requested, whichever comes
    /// first. Returns `true` if the wait ended because of a stop request.
    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool;
}

/// Wall-clock implementation backed by `Instant` and the stop channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool {
        stop.wait_timeout(duration)
    }
}
