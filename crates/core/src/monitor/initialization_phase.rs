use crate::capture::domain::capture_error::CaptureError;
use crate::monitor::monitor_context::{MonitorContext, MonitorDevices};
use crate::monitor::monitor_error::InitFailure;
use crate::shared::clock::Clock;
use crate::shared::stop_signal::StopSignal;

/// Waits until the user is seen once, polling the already-open camera every
/// `init_poll_interval`.
///
/// On success the tracker is seeded as present at the time of the
/// sighting. Fails with [`InitFailure::NoUserDetected`] once
/// `initialization_timeout` has elapsed without a face, and with
/// [`InitFailure::CameraUnavailable`] as soon as the camera is gone.
/// A read that fails transiently is retried after `frame_retry_backoff`.
pub fn await_initial_presence(
    context: &mut MonitorContext,
    devices: &mut MonitorDevices,
    clock: &dyn Clock,
    stop: &StopSignal,
) -> Result<(), InitFailure> {
    let config = context.config().clone();
    let timeout = config.initialization_timeout;

    if !devices.capture.is_open() {
        return Err(InitFailure::CameraUnavailable(CaptureError::Unavailable(
            "camera not open".into(),
        )));
    }

    log::info!(
        "Waiting up to {:.0}s for a face in front of the camera",
        timeout.as_secs_f64()
    );

    let started = clock.now();
    while clock.now().saturating_duration_since(started) < timeout {
        if stop.is_stopped() {
            return Err(InitFailure::Interrupted);
        }

        let frame = match devices.capture.read_frame() {
            Ok(frame) => frame,
            Err(e) if e.is_unavailable() => return Err(InitFailure::CameraUnavailable(e)),
            Err(e) => {
                log::warn!("Frame read failed during initialization: {e}");
                if clock.sleep(config.frame_retry_backoff, stop) {
                    return Err(InitFailure::Interrupted);
                }
                continue;
            }
        };

        if devices.face_found(&frame) {
            let now = clock.now();
            context.tracker.seed(now);
            log::info!(
                "User detected after {:.1}s",
                now.saturating_duration_since(started).as_secs_f64()
            );
            return Ok(());
        }

        if clock.sleep(config.init_poll_interval, stop) {
            return Err(InitFailure::Interrupted);
        }
    }

    Err(InitFailure::NoUserDetected { timeout })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::shared::run_config::RunConfig;
    use crate::testing::{
        devices, faces, no_faces, CountingLocker, ManualClock, Read, ScriptedCamera,
    };

    fn run(
        camera: ScriptedCamera,
        clock: &ManualClock,
        stop: &StopSignal,
    ) -> (MonitorContext, Result<(), InitFailure>) {
        let mut context = MonitorContext::new(RunConfig::default());
        let mut devices = devices(camera, CountingLocker::new());
        let result = await_initial_presence(&mut context, &mut devices, clock, stop);
        (context, result)
    }

    #[test]
    fn test_face_just_before_timeout_succeeds() {
        // Polls at 0.0, 0.5, ..., 59.0 see nobody; the poll at 59.5 does.
        let mut script = no_faces(119);
        script.extend(faces(1));
        let camera = ScriptedCamera::new(script).opened();
        let clock = ManualClock::new();

        let (context, result) = run(camera, &clock, &StopSignal::new());

        assert!(result.is_ok());
        assert!(context.tracker.is_present());
        assert_eq!(
            context.tracker.last_seen_at(),
            Some(clock.start() + Duration::from_secs_f64(59.5))
        );
    }

    #[test]
    fn test_no_face_within_timeout_fails() {
        let camera = ScriptedCamera::endless(Read::NoFace).opened();
        let clock = ManualClock::new();

        let (context, result) = run(camera, &clock, &StopSignal::new());

        match result {
            Err(InitFailure::NoUserDetected { timeout }) => {
                assert_eq!(timeout, Duration::from_secs(60))
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(clock.elapsed(), Duration::from_secs(60));
        assert!(!context.tracker.is_present());
        assert_eq!(context.tracker.last_seen_at(), None);
    }

    #[test]
    fn test_unavailable_camera_fails_immediately() {
        let camera = ScriptedCamera::new(vec![Read::Unplug]).opened();
        let clock = ManualClock::new();

        let (_, result) = run(camera, &clock, &StopSignal::new());

        assert!(matches!(result, Err(InitFailure::CameraUnavailable(_))));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_closed_camera_is_unavailable() {
        let camera = ScriptedCamera::endless(Read::Face);
        let stats = camera.stats();
        let clock = ManualClock::new();

        let (_, result) = run(camera, &clock, &StopSignal::new());

        assert!(matches!(result, Err(InitFailure::CameraUnavailable(_))));
        assert_eq!(stats.lock().unwrap().reads, 0);
    }

    #[test]
    fn test_transient_read_is_retried_after_backoff() {
        let camera = ScriptedCamera::new(vec![Read::Transient, Read::Face]).opened();
        let clock = ManualClock::new();

        let (context, result) = run(camera, &clock, &StopSignal::new());

        assert!(result.is_ok());
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
        assert_eq!(
            context.tracker.last_seen_at(),
            Some(clock.start() + Duration::from_secs(1))
        );
    }

    #[test]
    fn test_detector_error_counts_as_no_face() {
        let camera = ScriptedCamera::new(vec![Read::DetectorError, Read::Face]).opened();
        let clock = ManualClock::new();

        let (_, result) = run(camera, &clock, &StopSignal::new());

        assert!(result.is_ok());
        assert_eq!(clock.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn test_stop_request_interrupts_wait() {
        let camera = ScriptedCamera::endless(Read::NoFace).opened();
        let clock = ManualClock::new();
        let stop = StopSignal::new();
        stop.request();

        let (_, result) = run(camera, &clock, &stop);

        assert!(matches!(result, Err(InitFailure::Interrupted)));
    }
}
