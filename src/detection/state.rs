use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::common::Color;
use crate::detection::scheduler::{DebounceScheduler, DebounceTimings};
use crate::detection::selector::DetectorConfig;

pub type SharedState = Arc<Mutex<DetectionState>>;
pub type SharedConfig = Arc<RwLock<DetectorConfig>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CameraStatus {
    pub camera_running: bool,
    pub camera_opened: bool,
}

/// Everything the detection loop mutates. Lives behind one mutex so that the
/// loop, deferred tasks and API readers never observe a partial update.
#[derive(Debug)]
pub struct DetectionState {
    pub current_color: Color,
    pub scheduler: DebounceScheduler,
    pub camera: CameraStatus,
    pub frames_processed: u64,
}

impl DetectionState {
    pub fn new(timings: DebounceTimings) -> Self {
        Self {
            current_color: Color::BLACK,
            scheduler: DebounceScheduler::new(timings),
            camera: CameraStatus::default(),
            frames_processed: 0,
        }
    }

    pub fn shared(timings: DebounceTimings) -> SharedState {
        Arc::new(Mutex::new(Self::new(timings)))
    }
}
