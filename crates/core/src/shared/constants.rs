use std::time::Duration;

pub const APP_NAME: &str = "Presence Guard";

pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const DEFAULT_INITIALIZATION_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ABSENCE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_INIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pause after a frame read that failed but left the device usable.
pub const DEFAULT_FRAME_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Pause after an unexpected fault inside a monitoring tick.
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(2);

pub const DEFAULT_SUPERVISOR_INTERVAL: Duration = Duration::from_secs(1);

/// Requested capture format. Devices are free to pick something else.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;
pub const CAPTURE_FPS: u32 = 15;

/// Consecutive failed reads after which the camera is treated as gone.
pub const MAX_CONSECUTIVE_READ_FAILURES: u32 = 10;
