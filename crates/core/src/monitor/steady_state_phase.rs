use std::panic::{self, AssertUnwindSafe};

use crate::capture::domain::capture_error::CaptureError;
use crate::monitor::monitor_context::{MonitorContext, MonitorDevices};
use crate::monitor::monitor_error::{panic_message, TickError};
use crate::presence::domain::detection_sample::DetectionSample;
use crate::presence::domain::presence_tracker::{Decision, Observation, PresenceEvent};
use crate::shared::clock::Clock;
use crate::shared::stop_signal::StopSignal;

/// How a steady-state run ended.
#[derive(Debug)]
pub enum SteadyStateExit {
    /// A stop was requested.
    Stopped,
    /// The camera could not be reopened or went away mid-run.
    CameraUnavailable(CaptureError),
}

/// Polls the camera every `poll_interval` and locks the screen once the
/// user has been gone for `absence_timeout`.
///
/// Reopens the camera first if it is closed. A transient frame failure
/// skips the tick and waits `frame_retry_backoff`; any other fault inside
/// a tick, panics included, is logged and waited out for `error_backoff`.
/// Only a stop request or a lost camera ends the run, and the camera is
/// released either way.
pub fn run_steady_state(
    context: &mut MonitorContext,
    devices: &mut MonitorDevices,
    clock: &dyn Clock,
    stop: &StopSignal,
) -> SteadyStateExit {
    if let Err(e) = devices.capture.open() {
        log::error!("Could not open camera: {e}");
        return SteadyStateExit::CameraUnavailable(e);
    }

    let config = context.config().clone();
    log::info!(
        "Monitoring presence every {:.1}s, locking after {:.0}s of absence",
        config.poll_interval.as_secs_f64(),
        config.absence_timeout.as_secs_f64()
    );

    let exit = loop {
        if stop.is_stopped() {
            break SteadyStateExit::Stopped;
        }

        let pause = match guarded_tick(context, devices, clock) {
            Ok(_) => config.poll_interval,
            Err(TickError::CameraUnavailable(e)) => {
                log::error!("Camera unavailable: {e}");
                break SteadyStateExit::CameraUnavailable(e);
            }
            Err(e @ TickError::FrameRead(_)) => {
                log::warn!("Skipping tick, frame read failed: {e}");
                config.frame_retry_backoff
            }
            Err(e @ TickError::Unexpected(_)) => {
                log::error!("{e}");
                config.error_backoff
            }
        };

        if clock.sleep(pause, stop) {
            break SteadyStateExit::Stopped;
        }
    };

    devices.capture.release();
    exit
}

/// One poll: read a frame, detect, update the tracker and lock if due.
///
/// A lock is only recorded as issued once the actuator reports success;
/// a failed lock is attempted again on the next tick.
pub fn tick(
    context: &mut MonitorContext,
    devices: &mut MonitorDevices,
    clock: &dyn Clock,
) -> Result<Observation, TickError> {
    if !devices.capture.is_open() {
        return Err(TickError::CameraUnavailable(CaptureError::Unavailable(
            "camera not open".into(),
        )));
    }

    let frame = devices.capture.read_frame()?;
    let face_found = devices.face_found(&frame);
    let now = clock.now();
    let observation = context.tracker.observe(DetectionSample::new(now, face_found));

    match observation.event {
        Some(PresenceEvent::UserReturned) => log::info!("User returned"),
        Some(PresenceEvent::UserAbsent) => log::info!("User absent, countdown started"),
        None => {}
    }

    if observation.decision == Decision::LockNow {
        let absent = context.tracker.absent_for(now).unwrap_or_default();
        log::warn!(
            "User absent for {:.1}s, locking screen",
            absent.as_secs_f64()
        );
        match devices.locker.lock_screen() {
            Ok(()) => {
                context.tracker.mark_lock_issued();
                log::info!("Screen locked");
            }
            Err(e) => log::error!("Failed to lock screen: {e}"),
        }
    }

    Ok(observation)
}

fn guarded_tick(
    context: &mut MonitorContext,
    devices: &mut MonitorDevices,
    clock: &dyn Clock,
) -> Result<Observation, TickError> {
    panic::catch_unwind(AssertUnwindSafe(|| tick(context, devices, clock)))
        .unwrap_or_else(|payload| {
            Err(TickError::Unexpected(format!(
                "panic in monitoring tick: {}",
                panic_message(payload.as_ref())
            )))
        })
}
