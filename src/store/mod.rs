mod json_store;
mod memory_store;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;

use async_trait::async_trait;

use crate::detection::DetectorConfig;
use crate::error::ConfigError;

/// Persistence for the detector configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The stored document merged over defaults. Unreadable or invalid
    /// documents are logged and replaced by defaults.
    async fn load(&self) -> DetectorConfig;

    async fn save(&self, config: &DetectorConfig) -> Result<(), ConfigError>;
}
