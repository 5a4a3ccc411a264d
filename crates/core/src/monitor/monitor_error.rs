use std::any::Any;
use std::time::Duration;

use thiserror::Error;

use crate::capture::domain::capture_error::CaptureError;

/// Why a single steady-state tick did not complete.
#[derive(Error, Debug)]
pub enum TickError {
    /// The frame could not be read but the camera is still usable.
    #[error(transparent)]
    FrameRead(CaptureError),
    /// The camera is gone; the monitoring phase has to end.
    #[error(transparent)]
    CameraUnavailable(CaptureError),
    /// Anything else that went wrong inside the tick, including panics
    /// raised by an adapter.
    #[error("unexpected monitoring fault: {0}")]
    Unexpected(String),
}

impl TickError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, TickError::CameraUnavailable(_))
    }
}

impl From<CaptureError> for TickError {
    fn from(e: CaptureError) -> Self {
        if e.is_unavailable() {
            TickError::CameraUnavailable(e)
        } else {
            TickError::FrameRead(e)
        }
    }
}

#[derive(Error, Debug)]
pub enum InitFailure {
    #[error("no user detected within {}s", .timeout.as_secs_f64())]
    NoUserDetected { timeout: Duration },
    #[error(transparent)]
    CameraUnavailable(CaptureError),
    #[error("interrupted while waiting for the user")]
    Interrupted,
    /// A camera or detector adapter panicked while waiting for the user.
    #[error("unexpected fault while waiting for the user: {0}")]
    Unexpected(String),
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    CameraUnavailable(CaptureError),
    #[error("initialization failed: {0}")]
    Init(#[source] InitFailure),
    #[error("monitoring worker stopped {restarts} times, giving up")]
    RestartLimitReached { restarts: u32 },
    #[error("monitoring worker panicked")]
    WorkerPanicked,
    #[error("failed to spawn monitoring worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
