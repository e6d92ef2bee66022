use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    api::DetectorApi,
    camera::FrameSource,
    config::Settings,
    detection::{
        CameraStatus, ColorExtractor, DebounceTimings, DetectionPipeline, DetectionState,
        SharedState,
    },
    error::{AcquisitionError, AppError},
    notifier::{ActuatorNotifier, NotificationDispatcher, TcpNotifier},
    store::{ConfigStore, JsonFileStore},
};

/// Owns the single detection task. Dropping it stops detection.
pub struct Coordinator {
    detection_task: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    fn new(
        source: Box<dyn FrameSource>,
        pipeline: DetectionPipeline,
        state: SharedState,
        frame_interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            detection_task: Self::start_detection_task(
                source,
                pipeline,
                state,
                frame_interval,
                cancel_token.clone(),
            ),
            cancel_token,
        }
    }

    fn start_detection_task(
        mut source: Box<dyn FrameSource>,
        pipeline: DetectionPipeline,
        state: SharedState,
        frame_interval: Duration,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("Detection loop started, one frame every {:?}", frame_interval);
            state.lock().await.camera = CameraStatus {
                camera_running: true,
                camera_opened: source.is_opened(),
            };

            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match source.fetch_frame().await {
                    Ok(frame) => {
                        let outcome = pipeline.process_frame(&frame, Instant::now()).await;
                        tracing::trace!("Frame {} -> {:?}", frame.frame_id(), outcome);
                    }
                    Err(AcquisitionError::Unavailable) => {
                        tracing::trace!("No new frame this tick");
                    }
                    Err(e) => {
                        tracing::warn!("Frame unavailable: {}", e);
                    }
                }

                let opened = source.is_opened();
                let mut guard = state.lock().await;
                if guard.camera.camera_opened != opened {
                    tracing::info!("Frame source opened: {}", opened);
                    guard.camera.camera_opened = opened;
                }
            }

            source.stop().await;
            state.lock().await.camera = CameraStatus::default();
            tracing::info!("Detection loop stopped");
        })
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Stops detection and waits for the loop to exit. Deferred secondary
    /// signals still waiting are cancelled.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.stop();
        (&mut self.detection_task)
            .await
            .map_err(|e| AppError::Coordinator(format!("Detection task failed: {e}")))
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    settings: Settings,
    frame_source: Option<Box<dyn FrameSource>>,
    notifier: Option<Arc<dyn ActuatorNotifier>>,
    store: Option<Arc<dyn ConfigStore>>,
}

impl CoordinatorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            frame_source: None,
            notifier: None,
            store: None,
        }
    }

    pub fn frame_source(mut self, frame_source: Box<dyn FrameSource>) -> Self {
        self.frame_source = Some(frame_source);
        self
    }

    // Replaces the TCP notifier built from the actuator settings.
    pub fn notifier(mut self, notifier: Arc<dyn ActuatorNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    // Replaces the JSON file store built from the store settings.
    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Loads the detector configuration and starts the detection task.
    pub async fn build(self) -> Result<(Coordinator, DetectorApi), AppError> {
        let source = self
            .frame_source
            .ok_or(AppError::Coordinator("Frame source not set".to_string()))?;
        let settings = self.settings;
        let notifier: Arc<dyn ActuatorNotifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(TcpNotifier::from_settings(&settings.actuator)),
        };
        let store: Arc<dyn ConfigStore> = match self.store {
            Some(store) => store,
            None => Arc::new(JsonFileStore::new(settings.store.path.clone())),
        };

        let config = store.load().await;
        tracing::info!(
            selectors = config.selectors.len(),
            notifications = config.notifications_enabled(),
            "Detector configuration ready"
        );
        let config = Arc::new(RwLock::new(config));
        let state = DetectionState::shared(DebounceTimings::from(&settings.detection));

        let cancel_token = CancellationToken::new();
        let dispatcher = NotificationDispatcher::new(
            notifier.clone(),
            state.clone(),
            cancel_token.child_token(),
        );
        let pipeline = DetectionPipeline::new(
            ColorExtractor::new(settings.detection.region_size),
            state.clone(),
            config.clone(),
            dispatcher,
        );
        let api = DetectorApi::new(state.clone(), config, store, notifier);

        let coordinator = Coordinator::new(
            source,
            pipeline,
            state,
            settings.camera.frame_interval(),
            cancel_token,
        );
        Ok((coordinator, api))
    }
}
