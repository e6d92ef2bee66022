use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::detection::DetectorConfig;
use crate::error::ConfigError;
use crate::store::ConfigStore;

/// Non-persistent store, for running without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<DetectorConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            saved: Mutex::new(Some(config)),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self) -> DetectorConfig {
        self.saved.lock().await.clone().unwrap_or_default()
    }

    async fn save(&self, config: &DetectorConfig) -> Result<(), ConfigError> {
        *self.saved.lock().await = Some(config.clone());
        Ok(())
    }
}
