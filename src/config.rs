use std::path::PathBuf;
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

const SETTINGS_FILE: &str = "chroma_sort";
const ENV_PREFIX: &str = "CHROMA_SORT";

/// Process settings, layered from defaults, an optional `chroma_sort.*` file
/// and `CHROMA_SORT__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub camera: CameraSettings,
    pub detection: DetectionSettings,
    pub actuator: ActuatorSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub frame_path: Option<PathBuf>,
    pub frame_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub region_size: u32,
    pub cooldown_ms: u64,
    pub suppression_secs: u64,
    pub secondary_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActuatorSettings {
    pub port: u16,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub path: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            frame_path: None,
            // ~30 frames per second
            frame_interval_ms: 33,
        }
    }
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            region_size: 100,
            cooldown_ms: 750,
            suppression_secs: 20,
            secondary_delay_secs: 5,
        }
    }
}

impl Default for ActuatorSettings {
    fn default() -> Self {
        Self {
            port: 4210,
            timeout_ms: 1500,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("config.json"),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        let settings = Config::builder()
            .add_source(File::with_name(SETTINGS_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

impl CameraSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl ActuatorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
