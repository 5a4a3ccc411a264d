mod logging;
mod platform;
mod signals;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use presence_guard_core::capture::infrastructure::ffmpeg_camera::FfmpegCamera;
use presence_guard_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use presence_guard_core::lock::infrastructure::command_screen_locker::CommandScreenLocker;
use presence_guard_core::monitor::monitor_context::{MonitorContext, MonitorDevices};
use presence_guard_core::monitor::supervisor::run_monitor;
use presence_guard_core::shared::clock::SystemClock;
use presence_guard_core::shared::constants::{APP_NAME, YOLO_MODEL_NAME, YOLO_MODEL_URL};
use presence_guard_core::shared::model_resolver;
use presence_guard_core::shared::run_config::RunConfig;
use presence_guard_core::shared::stop_signal::StopSignal;

/// Locks the screen when nobody is in front of the camera.
#[derive(Parser, Debug)]
#[command(name = "presence-guard", version)]
struct Cli {
    /// Register to start automatically at login, then exit.
    #[arg(long)]
    setup_startup: bool,

    /// Config file (defaults to the per-user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to wait for the user at startup.
    #[arg(long, value_name = "SECS")]
    init_timeout: Option<f64>,

    /// Seconds of absence before the screen is locked.
    #[arg(long, value_name = "SECS")]
    absence_timeout: Option<f64>,

    /// Seconds between camera polls while monitoring.
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<f64>,

    /// Camera device (e.g. /dev/video0, or an index on macOS and Windows).
    #[arg(long)]
    camera: Option<String>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Log file to append to.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref());

    let result = run(cli);
    if let Err(e) = &result {
        log::error!("{e}");
    }
    ExitCode::from(exit_status(&result))
}

/// 0 for a normal finish or an interrupt, 1 for any failure, including
/// nobody showing up during initialization.
fn exit_status(result: &Result<(), Box<dyn std::error::Error>>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.setup_startup {
        let exe = std::env::current_exe()?;
        let location = platform::register_autostart(&exe)?;
        log::info!("{APP_NAME} will start at login ({location})");
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::info!("Starting {APP_NAME} with camera {}", config.camera);

    let devices = build_devices(&config)?;

    let stop = StopSignal::new();
    signals::spawn_listener(stop.clone())?;
    run_monitor(
        MonitorContext::new(config),
        devices,
        Arc::new(SystemClock),
        stop,
    )?;
    log::info!("{APP_NAME} finished");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut config = match cli.config.clone().or_else(RunConfig::default_path) {
        Some(path) => RunConfig::load(&path)?,
        None => RunConfig::default(),
    };
    apply_overrides(&mut config, cli)?;
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut RunConfig, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(secs) = cli.init_timeout {
        config.initialization_timeout = seconds("init-timeout", secs)?;
    }
    if let Some(secs) = cli.absence_timeout {
        config.absence_timeout = seconds("absence-timeout", secs)?;
    }
    if let Some(secs) = cli.poll_interval {
        config.poll_interval = seconds("poll-interval", secs)?;
    }
    if let Some(camera) = &cli.camera {
        config.camera = camera.clone();
    }
    if let Some(confidence) = cli.confidence {
        config.confidence = confidence;
    }
    Ok(())
}

fn seconds(flag: &str, secs: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("--{flag} must be a non-negative number of seconds, got {secs}"))
}

fn build_devices(config: &RunConfig) -> Result<MonitorDevices, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        YOLO_MODEL_NAME,
        YOLO_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    )?;
    let detector = OnnxYoloDetector::new(&model_path, config.confidence)?;

    Ok(MonitorDevices::new(
        Box::new(FfmpegCamera::new(config.camera.as_str())),
        Box::new(detector),
        Box::new(CommandScreenLocker::new()),
    ))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presence_guard_core::capture::domain::capture_error::CaptureError;
    use presence_guard_core::monitor::monitor_error::{InitFailure, MonitorError};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("presence-guard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_exit_status_for_outcomes() {
        let interrupted: Result<(), Box<dyn std::error::Error>> = Ok(());
        let no_user: Result<(), Box<dyn std::error::Error>> =
            Err(Box::new(MonitorError::Init(InitFailure::NoUserDetected {
                timeout: Duration::from_secs(60),
            })));
        let camera_gone: Result<(), Box<dyn std::error::Error>> = Err(Box::new(
            MonitorError::CameraUnavailable(CaptureError::Unavailable("unplugged".into())),
        ));

        assert_eq!(exit_status(&interrupted), 0);
        assert_eq!(exit_status(&no_user), 1);
        assert_eq!(exit_status(&camera_gone), 1);
    }

    #[test]
    fn test_no_flags_runs_monitor() {
        let cli = parse(&[]);
        assert!(!cli.setup_startup);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "--absence-timeout",
            "30",
            "--poll-interval",
            "0.25",
            "--camera",
            "/dev/video2",
            "--confidence",
            "0.7",
        ]);
        let mut config = RunConfig::default();

        apply_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.absence_timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.camera, "/dev/video2");
        assert_eq!(config.confidence, 0.7);
        assert_eq!(config.initialization_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_negative_seconds_rejected() {
        let cli = parse(&["--init-timeout=-5"]);
        let mut config = RunConfig::default();
        let err = apply_overrides(&mut config, &cli).unwrap_err();
        assert!(err.to_string().contains("--init-timeout"));
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"absenceTimeout": 20, "camera": "/dev/video1"}"#).unwrap();
        let cli = parse(&["--config", path.to_str().unwrap(), "--camera", "/dev/video3"]);

        let config = load_config(&cli).unwrap();

        assert_eq!(config.absence_timeout, Duration::from_secs(20));
        assert_eq!(config.camera, "/dev/video3");
    }

    #[test]
    fn test_out_of_range_confidence_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let cli = parse(&["--config", path.to_str().unwrap(), "--confidence", "1.5"]);
        assert!(load_config(&cli).is_err());
    }
}
