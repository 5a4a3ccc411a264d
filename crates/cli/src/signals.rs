use std::io;
use std::thread;

use presence_guard_core::shared::stop_signal::StopSignal;
use tokio::signal;

/// Requests `stop` once Ctrl+C (or SIGTERM on unix) arrives.
///
/// The signal handlers run on a single-threaded tokio runtime owned by a
/// detached background thread, so the monitor itself stays fully
/// synchronous.
pub fn spawn_listener(stop: StopSignal) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("signal-listener".into())
        .spawn(move || {
            runtime.block_on(wait_for_shutdown());
            log::info!("Shutdown signal received, stopping");
            stop.request();
        })?;
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
