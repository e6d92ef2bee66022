pub mod extractor;
pub mod matcher;
pub mod pipeline;
pub mod scheduler;
pub mod selector;
pub mod state;

pub use extractor::{ColorExtractor, Region};
pub use matcher::first_match;
pub use pipeline::{DetectionPipeline, FrameOutcome};
pub use scheduler::{DebounceScheduler, DebounceTimings, SchedulerPhase, TriggerDecision};
pub use selector::{DetectorConfig, Selector};
pub use state::{CameraStatus, DetectionState, SharedConfig, SharedState};
