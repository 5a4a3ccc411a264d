//! Scripted stand-ins for the camera, detector, lock and clock, shared by
//! the monitor tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_source::CaptureSource;
use crate::detection::domain::face_detector::FaceDetector;
use crate::lock::domain::screen_locker::{LockError, ScreenLocker};
use crate::monitor::monitor_context::MonitorDevices;
use crate::shared::clock::Clock;
use crate::shared::frame::Frame;
use crate::shared::stop_signal::StopSignal;

const FACE: u8 = 255;
const NO_FACE: u8 = 0;
const DETECTOR_ERROR: u8 = 1;
const DETECTOR_PANIC: u8 = 2;

/// One scripted `read_frame` result.
#[derive(Clone, Debug)]
pub enum Read {
    Face,
    NoFace,
    /// Frame whose detection returns an error.
    DetectorError,
    /// Frame whose detection panics.
    DetectorPanic,
    Transient,
    /// Device disappears: `Unavailable`, and the camera closes.
    Unplug,
}

pub fn faces(n: usize) -> Vec<Read> {
    vec![Read::Face; n]
}

pub fn no_faces(n: usize) -> Vec<Read> {
    vec![Read::NoFace; n]
}

#[derive(Debug, Default)]
pub struct CameraStats {
    pub opens: usize,
    pub releases: usize,
    pub reads: usize,
    pub open: bool,
}

/// Camera that plays back a script; once exhausted it either repeats a
/// fixed read forever or behaves as unplugged.
pub struct ScriptedCamera {
    script: VecDeque<Read>,
    endless: Option<Read>,
    fail_opens: usize,
    stats: Arc<Mutex<CameraStats>>,
    index: usize,
}

impl ScriptedCamera {
    pub fn new(script: Vec<Read>) -> Self {
        Self {
            script: script.into(),
            endless: None,
            fail_opens: 0,
            stats: Arc::new(Mutex::new(CameraStats::default())),
            index: 0,
        }
    }

    pub fn endless(read: Read) -> Self {
        let mut camera = Self::new(Vec::new());
        camera.endless = Some(read);
        camera
    }

    /// Starts already open, as after a successful startup.
    pub fn opened(self) -> Self {
        self.stats.lock().unwrap().open = true;
        self
    }

    pub fn failing_opens(mut self, n: usize) -> Self {
        self.fail_opens = n;
        self
    }

    pub fn stats(&self) -> Arc<Mutex<CameraStats>> {
        self.stats.clone()
    }

    fn frame(&mut self, marker: u8) -> Frame {
        let frame = Frame::new(vec![marker; 2 * 2 * 3], 2, 2, 3, self.index);
        self.index += 1;
        frame
    }
}

impl CaptureSource for ScriptedCamera {
    fn open(&mut self) -> Result<(), CaptureError> {
        let mut stats = self.stats.lock().unwrap();
        if stats.open {
            return Ok(());
        }
        if self.fail_opens > 0 {
            self.fail_opens -= 1;
            return Err(CaptureError::Unavailable("scripted open failure".into()));
        }
        stats.opens += 1;
        stats.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stats.lock().unwrap().open
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        self.stats.lock().unwrap().reads += 1;
        let read = match self.script.pop_front() {
            Some(read) => read,
            None => self.endless.clone().unwrap_or(Read::Unplug),
        };
        match read {
            Read::Face => Ok(self.frame(FACE)),
            Read::NoFace => Ok(self.frame(NO_FACE)),
            Read::DetectorError => Ok(self.frame(DETECTOR_ERROR)),
            Read::DetectorPanic => Ok(self.frame(DETECTOR_PANIC)),
            Read::Transient => Err(CaptureError::Transient("scripted hiccup".into())),
            Read::Unplug => {
                self.stats.lock().unwrap().open = false;
                Err(CaptureError::Unavailable("scripted unplug".into()))
            }
        }
    }

    fn release(&mut self) {
        let mut stats = self.stats.lock().unwrap();
        stats.releases += 1;
        stats.open = false;
    }
}

/// Reads the marker byte the scripted camera writes into each frame.
pub struct MarkerDetector;

impl FaceDetector for MarkerDetector {
    fn detect(&mut self, frame: &Frame) -> Result<bool, Box<dyn std::error::Error>> {
        match frame.data()[0] {
            FACE => Ok(true),
            DETECTOR_ERROR => Err("scripted detector failure".into()),
            DETECTOR_PANIC => panic!("scripted detector panic"),
            _ => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct LockerStats {
    pub calls: usize,
    pub successes: usize,
}

/// Lock actuator that records calls and fails the first `fail_first` ones.
pub struct CountingLocker {
    fail_first: usize,
    stats: Arc<Mutex<LockerStats>>,
}

impl CountingLocker {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            stats: Arc::new(Mutex::new(LockerStats::default())),
        }
    }

    pub fn stats(&self) -> Arc<Mutex<LockerStats>> {
        self.stats.clone()
    }
}

impl ScreenLocker for CountingLocker {
    fn lock_screen(&mut self) -> Result<(), LockError> {
        let mut stats = self.stats.lock().unwrap();
        stats.calls += 1;
        if stats.calls <= self.fail_first {
            return Err(LockError::CommandFailed {
                program: "fake-lock".into(),
                status: "exit status: 1".into(),
            });
        }
        stats.successes += 1;
        Ok(())
    }
}

/// Clock whose time only moves when someone sleeps on it.
#[derive(Clone)]
pub struct ManualClock {
    start: Instant,
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Instant::now();
        Self {
            start,
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap() - self.start
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool {
        *self.now.lock().unwrap() += duration;
        std::thread::yield_now();
        stop.is_stopped()
    }
}

pub fn devices(camera: ScriptedCamera, locker: CountingLocker) -> MonitorDevices {
    MonitorDevices::new(Box::new(camera), Box::new(MarkerDetector), Box::new(locker))
}
