use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

/// Broadcast stop request shared between the supervisor, the monitoring
/// worker and the interrupt handler.
///
/// Nothing is ever sent on the channel. Requesting a stop drops the only
/// sender, which disconnects every clone of the receiver at once, so any
/// thread blocked in [`StopSignal::wait_timeout`] wakes immediately.
#[derive(Clone)]
pub struct StopSignal {
    sender: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded::<()>(0);
        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            receiver: rx,
        }
    }

    /// Idempotent.
    pub fn request(&self) {
        let mut guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Blocks for up to `timeout`. Returns `true` if a stop was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_new_signal_is_not_stopped() {
        let stop = StopSignal::new();
        assert!(!stop.is_stopped());
        assert!(!stop.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_request_is_visible_to_clones() {
        let stop = StopSignal::new();
        let other = stop.clone();
        stop.request();
        assert!(other.is_stopped());
        assert!(stop.is_stopped());
    }

    #[test]
    fn test_request_is_idempotent() {
        let stop = StopSignal::new();
        stop.request();
        stop.request();
        assert!(stop.is_stopped());
    }

    #[test]
    fn test_request_wakes_waiting_thread() {
        let stop = StopSignal::new();
        let waiter = stop.clone();
        let start = Instant::now();
        let handle = std::thread::spawn(move || waiter.wait_timeout(Duration::from_secs(30)));
        std::thread::sleep(Duration::from_millis(20));
        stop.request();
        assert!(handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
