use std::fmt;
use std::time::{Duration, Instant};

use super::detection_sample::DetectionSample;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceState {
    Present,
    Absent,
}

/// State transition noticed while observing a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceEvent {
    /// A face was found after one or more samples without one.
    UserReturned,
    /// The first sample without a face after presence; the absence
    /// countdown starts from the last sighting.
    UserAbsent,
}

impl fmt::Display for PresenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceEvent::UserReturned => write!(f, "user returned"),
            PresenceEvent::UserAbsent => write!(f, "user absent, countdown started"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    NoAction,
    LockNow,
}

/// What a single call to [`PresenceTracker::observe`] produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    pub event: Option<PresenceEvent>,
    pub decision: Decision,
}

/// Snapshot of the tracker's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackerState {
    pub present: bool,
    pub last_seen_at: Option<Instant>,
    pub lock_armed: bool,
}

/// Turns a stream of per-frame detections into presence transitions and
/// lock decisions.
///
/// Pure with respect to I/O: it never touches the camera or the lock
/// mechanism. The caller acts on [`Decision::LockNow`] and reports back
/// through [`PresenceTracker::mark_lock_issued`] once the lock went through.
///
/// A lock is issued at most once per absence episode. The guard is cleared
/// only by a new sighting, never by elapsed time, so a screen unlocked by
/// hand while nobody is in view is not locked again until someone has been
/// seen and left once more.
#[derive(Clone, Debug)]
pub struct PresenceTracker {
    absence_timeout: Duration,
    state: TrackerState,
}

impl PresenceTracker {
    pub fn new(absence_timeout: Duration) -> Self {
        Self {
            absence_timeout,
            state: TrackerState {
                present: false,
                last_seen_at: None,
                lock_armed: false,
            },
        }
    }

    pub fn absence_timeout(&self) -> Duration {
        self.absence_timeout
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn presence(&self) -> PresenceState {
        if self.state.present {
            PresenceState::Present
        } else {
            PresenceState::Absent
        }
    }

    pub fn is_present(&self) -> bool {
        self.state.present
    }

    pub fn last_seen_at(&self) -> Option<Instant> {
        self.state.last_seen_at
    }

    pub fn is_lock_armed(&self) -> bool {
        self.state.lock_armed
    }

    /// Time since the last sighting, or `None` if nobody was ever seen.
    pub fn absent_for(&self, now: Instant) -> Option<Duration> {
        self.state
            .last_seen_at
            .map(|seen| now.saturating_duration_since(seen))
    }

    /// Marks the user as present at `now` without emitting an event.
    /// Used once the initial sighting has been confirmed.
    pub fn seed(&mut self, now: Instant) {
        self.state = TrackerState {
            present: true,
            last_seen_at: Some(now),
            lock_armed: false,
        };
    }

    pub fn observe(&mut self, sample: DetectionSample) -> Observation {
        if sample.face_found {
            let event = if self.state.present {
                None
            } else {
                self.state.lock_armed = false;
                Some(PresenceEvent::UserReturned)
            };
            self.state.present = true;
            // Keep last_seen_at monotonic even if a caller hands in an
            // out-of-order timestamp.
            self.state.last_seen_at = Some(match self.state.last_seen_at {
                Some(prev) if prev > sample.timestamp => prev,
                _ => sample.timestamp,
            });
            return Observation {
                event,
                decision: Decision::NoAction,
            };
        }

        let event = if self.state.present {
            self.state.present = false;
            Some(PresenceEvent::UserAbsent)
        } else {
            None
        };

        let timed_out = self
            .absent_for(sample.timestamp)
            .is_some_and(|elapsed| elapsed >= self.absence_timeout);

        let decision = if timed_out && !self.state.lock_armed {
            Decision::LockNow
        } else {
            Decision::NoAction
        };

        Observation { event, decision }
    }

    /// Records that the lock for the current absence episode went through.
    ///
    /// Returns `false` and changes nothing if the user is currently present,
    /// since an armed lock only makes sense during an absence.
    pub fn mark_lock_issued(&mut self) -> bool {
        if self.state.present {
            return false;
        }
        self.state.lock_armed = true;
        true
    }
}
