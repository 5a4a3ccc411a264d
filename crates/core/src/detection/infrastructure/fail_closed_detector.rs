use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;

/// Decorator that turns any detection failure into "no face found".
///
/// Errors are logged and reported as absence.
pub struct FailClosedDetector {
    inner: Box<dyn FaceDetector>,
    failures: usize,
}

impl FailClosedDetector {
    pub fn new(inner: Box<dyn FaceDetector>) -> Self {
        Self { inner, failures: 0 }
    }

    /// Total number of detection errors swallowed so far.
    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl FaceDetector for FailClosedDetector {
    fn detect(&mut self, frame: &Frame) -> Result<bool, Box<dyn std::error::Error>> {
        match self.inner.detect(frame) {
            Ok(found) => Ok(found),
            Err(e) => {
                self.failures += 1;
                log::error!("Face detection failed on frame {}: {e}", frame.index());
                Ok(false)
            }
        }
    }
}
