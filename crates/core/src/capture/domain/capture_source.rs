use crate::shared::frame::Frame;

use super::capture_error::CaptureError;

/// A camera that hands out one frame per call.
///
/// The sequence is potentially infinite: `read_frame` keeps producing frames
/// until the device goes away, at which point it reports
/// [`CaptureError::Unavailable`]. Implementations own the device handle
/// exclusively; only one thread reads at a time.
pub trait CaptureSource: Send {
    /// Opens the device. Opening an already open source is a no-op.
    fn open(&mut self) -> Result<(), CaptureError>;

    fn is_open(&self) -> bool;

    /// Blocks until the next frame is available.
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device. Safe to call repeatedly.
    fn release(&mut self);
}
