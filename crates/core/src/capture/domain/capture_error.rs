use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The device cannot be opened or has stopped responding. Reading again
    /// without reopening will not help.
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    /// A single read produced no frame; the device is still usable.
    #[error("frame read failed: {0}")]
    Transient(String),
}

impl CaptureError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CaptureError::Unavailable(_))
    }
}
