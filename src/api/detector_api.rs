use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::common::Color;
use crate::detection::{CameraStatus, DetectorConfig, SchedulerPhase, SharedConfig, SharedState};
use crate::error::{AppError, NetworkError};
use crate::notifier::{ActuatorNotifier, Signal};
use crate::store::ConfigStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorReport {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub hex: String,
}

impl From<Color> for ColorReport {
    fn from(color: Color) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
            hex: color.to_hex(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionSnapshot {
    pub current_color: Color,
    pub phase: SchedulerPhase,
    pub secondary_pending: bool,
    pub frames_processed: u64,
}

/// Handle for the web layer: reads detection state, edits configuration and
/// fires manual signals.
#[derive(Clone)]
pub struct DetectorApi {
    state: SharedState,
    config: SharedConfig,
    store: Arc<dyn ConfigStore>,
    notifier: Arc<dyn ActuatorNotifier>,
    // Serializes updates so the config lock is only held for the swap.
    update_lock: Arc<Mutex<()>>,
}

impl DetectorApi {
    pub fn new(
        state: SharedState,
        config: SharedConfig,
        store: Arc<dyn ConfigStore>,
        notifier: Arc<dyn ActuatorNotifier>,
    ) -> Self {
        Self {
            state,
            config,
            store,
            notifier,
            update_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn current_color(&self) -> Color {
        self.state.lock().await.current_color
    }

    pub async fn color_report(&self) -> ColorReport {
        self.current_color().await.into()
    }

    pub async fn status(&self) -> CameraStatus {
        self.state.lock().await.camera
    }

    pub async fn config(&self) -> DetectorConfig {
        self.config.read().await.clone()
    }

    /// Validates and persists `update`; the running detector only sees the
    /// new configuration once the save succeeded. Frames keep reading the
    /// previous configuration while the save is in flight.
    pub async fn set_config(&self, update: &Value) -> Result<DetectorConfig, AppError> {
        let _update = self.update_lock.lock().await;
        let current = self.config.read().await.clone();
        let updated = current
            .apply_update(update)
            .inspect_err(|e| warn!("Rejected configuration update: {}", e))?;
        self.store
            .save(&updated)
            .await
            .inspect_err(|e| warn!("Configuration update not persisted: {}", e))?;
        *self.config.write().await = updated.clone();
        info!(
            selectors = updated.selectors.len(),
            notifications = updated.notifications_enabled(),
            "Configuration updated"
        );
        Ok(updated)
    }

    /// Operator-triggered primary signal. Bypasses debouncing and reports
    /// failures to the caller.
    pub async fn send_manual_signal(&self, address: &str) -> Result<(), NetworkError> {
        info!("Manual signal requested for {}", address);
        self.notifier
            .send(address, Signal::Primary)
            .await
            .inspect_err(|e| warn!("Manual signal to {} failed: {}", address, e))
    }

    pub async fn detection_snapshot(&self) -> DetectionSnapshot {
        let state = self.state.lock().await;
        DetectionSnapshot {
            current_color: state.current_color,
            phase: state.scheduler.phase(Instant::now()),
            secondary_pending: state.scheduler.secondary_pending(),
            frames_processed: state.frames_processed,
        }
    }
}
