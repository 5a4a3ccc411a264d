use std::time::Instant;

/// Outcome of running the detector on one frame, stamped when it was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectionSample {
    pub timestamp: Instant,
    pub face_found: bool,
}

impl DetectionSample {
    pub fn new(timestamp: Instant, face_found: bool) -> Self {
        Self {
            timestamp,
            face_found,
        }
    }
}
