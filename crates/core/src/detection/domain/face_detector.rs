use crate::shared::frame::Frame;

/// Domain interface for face detection: is there a face in this frame?
///
/// Implementations may keep state between frames, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<bool, Box<dyn std::error::Error>>;
}
