use crate::capture::domain::capture_source::CaptureSource;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::fail_closed_detector::FailClosedDetector;
use crate::lock::domain::screen_locker::ScreenLocker;
use crate::presence::domain::presence_tracker::PresenceTracker;
use crate::shared::frame::Frame;
use crate::shared::run_config::RunConfig;

/// Configuration plus the tracker state that outlives any single
/// monitoring worker.
///
/// Explicitly constructed and passed by value into each phase; whichever
/// thread currently owns it is the only one touching the tracker.
#[derive(Clone, Debug)]
pub struct MonitorContext {
    config: RunConfig,
    pub tracker: PresenceTracker,
}

impl MonitorContext {
    pub fn new(config: RunConfig) -> Self {
        let tracker = PresenceTracker::new(config.absence_timeout);
        Self { config, tracker }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }
}

/// The I/O adapters the monitor drives.
///
/// Moved into the steady-state worker while it runs and handed back when
/// it is joined, so the camera has exactly one owner at any time.
pub struct MonitorDevices {
    pub capture: Box<dyn CaptureSource>,
    pub detector: Box<dyn FaceDetector>,
    pub locker: Box<dyn ScreenLocker>,
}

impl MonitorDevices {
    /// The detector is always wrapped so that detection errors read as
    /// "no face".
    pub fn new(
        capture: Box<dyn CaptureSource>,
        detector: Box<dyn FaceDetector>,
        locker: Box<dyn ScreenLocker>,
    ) -> Self {
        Self {
            capture,
            detector: Box::new(FailClosedDetector::new(detector)),
            locker,
        }
    }

    /// The detector is fail-closed: errors were already logged and read
    /// as no face.
    pub fn face_found(&mut self, frame: &Frame) -> bool {
        self.detector.detect(frame).unwrap_or(false)
    }
}
