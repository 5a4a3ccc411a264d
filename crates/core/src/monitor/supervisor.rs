use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::monitor::initialization_phase::await_initial_presence;
use crate::monitor::monitor_context::{MonitorContext, MonitorDevices};
use crate::monitor::monitor_error::{panic_message, InitFailure, MonitorError};
use crate::monitor::steady_state_phase::{run_steady_state, SteadyStateExit};
use crate::shared::clock::Clock;
use crate::shared::stop_signal::StopSignal;

type WorkerResult = (MonitorContext, MonitorDevices, SteadyStateExit);

/// Runs the whole presence watchdog until `stop` is requested.
///
/// Opens the camera, waits for the initial sighting, then runs the
/// steady-state loop on a dedicated worker thread. The worker is checked
/// every `supervisor_interval`; if it ends without a stop request it is
/// joined and a fresh one is started with the same tracker state, so an
/// absence that was already locked is not locked again.
///
/// Returns `Ok(())` on a stop request, including one that arrives during
/// initialization.
pub fn run_monitor(
    mut context: MonitorContext,
    mut devices: MonitorDevices,
    clock: Arc<dyn Clock>,
    stop: StopSignal,
) -> Result<(), MonitorError> {
    devices
        .capture
        .open()
        .map_err(MonitorError::CameraUnavailable)?;

    let init = panic::catch_unwind(AssertUnwindSafe(|| {
        await_initial_presence(&mut context, &mut devices, clock.as_ref(), &stop)
    }))
    .unwrap_or_else(|payload| Err(InitFailure::Unexpected(panic_message(payload.as_ref()))));

    match init {
        Ok(()) => {}
        Err(InitFailure::Interrupted) => {
            log::info!("Stopped during initialization");
            devices.capture.release();
            return Ok(());
        }
        Err(e) => {
            devices.capture.release();
            return Err(MonitorError::Init(e));
        }
    }

    let interval = context.config().supervisor_interval;
    let max_restarts = context.config().max_restarts;
    let mut restarts = 0u32;
    let mut worker = spawn_worker(context, devices, clock.clone(), stop.clone())?;

    loop {
        let stopping = stop.wait_timeout(interval);
        if !stopping && !worker.is_finished() {
            continue;
        }

        let (context, mut devices, exit) =
            worker.join().map_err(|_| MonitorError::WorkerPanicked)?;

        if stopping || matches!(exit, SteadyStateExit::Stopped) {
            devices.capture.release();
            log::info!("Monitoring stopped");
            return Ok(());
        }

        log::warn!("Monitoring worker ended unexpectedly: {exit:?}");
        if max_restarts.is_some_and(|max| restarts >= max) {
            devices.capture.release();
            return Err(MonitorError::RestartLimitReached { restarts });
        }

        restarts += 1;
        log::info!("Restarting monitoring worker (restart {restarts})");
        worker = spawn_worker(context, devices, clock.clone(), stop.clone())?;
    }
}

fn spawn_worker(
    mut context: MonitorContext,
    mut devices: MonitorDevices,
    clock: Arc<dyn Clock>,
    stop: StopSignal,
) -> Result<JoinHandle<WorkerResult>, MonitorError> {
    thread::Builder::new()
        .name("presence-monitor".into())
        .spawn(move || {
            let exit = run_steady_state(&mut context, &mut devices, clock.as_ref(), &stop);
            (context, devices, exit)
        })
        .map_err(MonitorError::Spawn)
}
