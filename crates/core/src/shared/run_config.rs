use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    APP_NAME, DEFAULT_ABSENCE_TIMEOUT, DEFAULT_ERROR_BACKOFF, DEFAULT_FRAME_RETRY_BACKOFF,
    DEFAULT_INITIALIZATION_TIMEOUT, DEFAULT_INIT_POLL_INTERVAL, DEFAULT_POLL_INTERVAL,
    DEFAULT_SUPERVISOR_INTERVAL,
};

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Monitor timing and device settings, fixed for the lifetime of a run.
///
/// Durations are stored as seconds (floats) in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    #[serde(with = "seconds")]
    pub initialization_timeout: Duration,
    #[serde(with = "seconds")]
    pub absence_timeout: Duration,
    #[serde(with = "seconds")]
    pub poll_interval: Duration,
    #[serde(with = "seconds")]
    pub init_poll_interval: Duration,
    #[serde(with = "seconds")]
    pub frame_retry_backoff: Duration,
    #[serde(with = "seconds")]
    pub error_backoff: Duration,
    #[serde(with = "seconds")]
    pub supervisor_interval: Duration,
    /// `None` restarts a failed monitoring worker forever.
    pub max_restarts: Option<u32>,
    pub camera: String,
    pub confidence: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initialization_timeout: DEFAULT_INITIALIZATION_TIMEOUT,
            absence_timeout: DEFAULT_ABSENCE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            init_poll_interval: DEFAULT_INIT_POLL_INTERVAL,
            frame_retry_backoff: DEFAULT_FRAME_RETRY_BACKOFF,
            error_backoff: DEFAULT_ERROR_BACKOFF,
            supervisor_interval: DEFAULT_SUPERVISOR_INTERVAL,
            max_restarts: None,
            camera: default_camera().to_string(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl RunConfig {
    /// `<config_dir>/Presence Guard/config.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join("config.json"))
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("initializationTimeout", self.initialization_timeout),
            ("absenceTimeout", self.absence_timeout),
            ("pollInterval", self.poll_interval),
            ("initPollInterval", self.init_poll_interval),
            ("frameRetryBackoff", self.frame_retry_backoff),
            ("errorBackoff", self.error_backoff),
            ("supervisorInterval", self.supervisor_interval),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::Invalid(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        if self.camera.trim().is_empty() {
            return Err(ConfigError::Invalid("camera must not be empty".into()));
        }
        Ok(())
    }
}

/// Default capture device for the platform's ffmpeg input format.
pub fn default_camera() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "/dev/video0"
    }
    #[cfg(not(target_os = "linux"))]
    {
        "0"
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
