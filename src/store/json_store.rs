use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::detection::DetectorConfig;
use crate::error::ConfigError;
use crate::store::ConfigStore;

/// Keeps the detector configuration in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn try_load(&self) -> Result<Option<DetectorConfig>, ConfigError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => DetectorConfig::from_document(&bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Read {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    fn write_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    async fn load(&self) -> DetectorConfig {
        match self.try_load().await {
            Ok(Some(config)) => {
                info!("Loaded configuration from {}", self.path.display());
                config
            }
            Ok(None) => {
                info!(
                    "No configuration at {}, using defaults",
                    self.path.display()
                );
                DetectorConfig::default()
            }
            Err(e) => {
                warn!("{}; falling back to defaults", e);
                DetectorConfig::default()
            }
        }
    }

    async fn save(&self, config: &DetectorConfig) -> Result<(), ConfigError> {
        let body = serde_json::to_vec_pretty(config)?;
        // Staging file sits next to the target so the rename stays atomic.
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, &body)
            .await
            .map_err(|e| self.write_error(e))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }
}
