use tokio::time::Instant;
use tracing::{debug, info};

use crate::common::{Color, Frame};
use crate::detection::extractor::ColorExtractor;
use crate::detection::matcher::first_match;
use crate::detection::scheduler::TriggerDecision;
use crate::detection::state::{SharedConfig, SharedState};
use crate::notifier::NotificationDispatcher;

/// What one processed frame led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    NoMatch {
        color: Color,
    },
    /// A selector matched but notifications are disabled.
    MatchedSilently {
        color: Color,
        selector_id: i64,
    },
    Matched {
        color: Color,
        selector_id: i64,
        decision: TriggerDecision,
    },
}

/// Frame -> color -> selector -> scheduler -> dispatch.
pub struct DetectionPipeline {
    extractor: ColorExtractor,
    state: SharedState,
    config: SharedConfig,
    dispatcher: NotificationDispatcher,
}

impl DetectionPipeline {
    pub fn new(
        extractor: ColorExtractor,
        state: SharedState,
        config: SharedConfig,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            extractor,
            state,
            config,
            dispatcher,
        }
    }

    pub async fn process_frame(&self, frame: &Frame, now: Instant) -> FrameOutcome {
        let color = self.extractor.dominant_color(frame);

        let (matched, address) = {
            let config = self.config.read().await;
            (
                first_match(&color, &config.selectors).map(|s| (s.id, s.name.clone())),
                config.notify_address().map(str::to_owned),
            )
        };

        let mut state = self.state.lock().await;
        state.current_color = color;
        state.frames_processed += 1;

        let Some((selector_id, selector_name)) = matched else {
            return FrameOutcome::NoMatch { color };
        };
        let Some(address) = address else {
            return FrameOutcome::MatchedSilently { color, selector_id };
        };

        let decision = state.scheduler.on_match(now);
        let secondary_at = now + state.scheduler.timings().secondary_delay;
        drop(state);

        match decision {
            TriggerDecision::Fire { schedule_secondary } => {
                info!(
                    selector = selector_id,
                    name = %selector_name,
                    color = %color,
                    "Accepted trigger, notifying {}",
                    address
                );
                self.dispatcher.dispatch_primary(address.clone());
                if schedule_secondary {
                    self.dispatcher.schedule_secondary(address, secondary_at);
                }
            }
            TriggerDecision::Suppressed | TriggerDecision::CoolingDown => {
                debug!(selector = selector_id, "Match dropped: {:?}", decision);
            }
        }

        FrameOutcome::Matched {
            color,
            selector_id,
            decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChannelOrder;
    use crate::detection::scheduler::DebounceTimings;
    use crate::detection::selector::DetectorConfig;
    use crate::detection::state::DetectionState;
    use crate::notifier::dispatcher::tests::RecordingNotifier;
    use crate::notifier::Signal;
    use image::{ImageBuffer, Rgb};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    struct Harness {
        pipeline: DetectionPipeline,
        state: SharedState,
        config: SharedConfig,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(notify_address: &str) -> Harness {
        let notifier = Arc::new(RecordingNotifier::default());
        let state = DetectionState::shared(DebounceTimings::default());
        let config = Arc::new(RwLock::new(DetectorConfig {
            notify_address: notify_address.to_string(),
            ..DetectorConfig::default()
        }));
        let dispatcher =
            NotificationDispatcher::new(notifier.clone(), state.clone(), CancellationToken::new());
        Harness {
            pipeline: DetectionPipeline::new(
                ColorExtractor::default(),
                state.clone(),
                config.clone(),
                dispatcher,
            ),
            state,
            config,
            notifier,
        }
    }

    fn solid(px: [u8; 3]) -> Frame {
        Frame::new(
            Uuid::new_v4(),
            ImageBuffer::from_pixel(160, 120, Rgb(px)),
            ChannelOrder::Rgb,
        )
    }

    /// Lets spawned sends run without moving the paused clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_matching_frame_only_updates_color() {
        let h = harness("10.0.0.9");
        let outcome = h
            .pipeline
            .process_frame(&solid([120, 120, 120]), Instant::now())
            .await;
        assert_eq!(
            outcome,
            FrameOutcome::NoMatch {
                color: Color::new(120, 120, 120)
            }
        );
        let state = h.state.lock().await;
        assert_eq!(state.current_color, Color::new(120, 120, 120));
        assert_eq!(state.frames_processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_notifications_still_detect() {
        let h = harness("");
        let outcome = h
            .pipeline
            .process_frame(&solid([255, 0, 0]), Instant::now())
            .await;
        assert_eq!(
            outcome,
            FrameOutcome::MatchedSilently {
                color: Color::new(255, 0, 0),
                selector_id: 1
            }
        );
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(h.notifier.sent.lock().await.is_empty());
        assert!(!h.state.lock().await.scheduler.secondary_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn suppression_window_drops_then_rearms() {
        let h = harness("10.0.0.9");
        let red = solid([255, 0, 0]);
        let t = Instant::now();

        let first = h.pipeline.process_frame(&red, t).await;
        assert!(matches!(
            first,
            FrameOutcome::Matched {
                decision: TriggerDecision::Fire { .. },
                ..
            }
        ));

        let second = h.pipeline.process_frame(&red, t + Duration::from_secs(1)).await;
        assert!(matches!(
            second,
            FrameOutcome::Matched {
                decision: TriggerDecision::Suppressed,
                ..
            }
        ));

        let third = h
            .pipeline
            .process_frame(&red, t + Duration::from_secs(21))
            .await;
        assert!(matches!(
            third,
            FrameOutcome::Matched {
                decision: TriggerDecision::Fire { .. },
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_frames_never_both_fire() {
        let h = harness("10.0.0.9");
        let red = solid([255, 0, 0]);
        let t = Instant::now();
        h.pipeline.process_frame(&red, t).await;
        h.pipeline
            .process_frame(&red, t + Duration::from_millis(500))
            .await;
        settle().await;
        assert_eq!(h.notifier.signals().await, vec![Signal::Primary]);
    }

    #[tokio::test(start_paused = true)]
    async fn exactly_one_secondary_per_trigger() {
        let h = harness("10.0.0.9");
        let red = solid([255, 0, 0]);
        let start = Instant::now();

        h.pipeline.process_frame(&red, start).await;
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(400)).await;
            h.pipeline.process_frame(&red, Instant::now()).await;
        }
        tokio::time::sleep_until(start + Duration::from_secs(6)).await;
        settle().await;

        let sent = h.notifier.sent.lock().await.clone();
        let signals: Vec<Signal> = sent.iter().map(|(_, s, _)| *s).collect();
        assert_eq!(signals, vec![Signal::Primary, Signal::Secondary]);
        assert_eq!(sent[0].2, start);
        assert_eq!(sent[1].2 - sent[0].2, Duration::from_secs(5));
        assert!(sent.iter().all(|(address, _, _)| address == "10.0.0.9"));
        assert!(!h.state.lock().await.scheduler.secondary_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn selector_updates_apply_to_next_frame() {
        let h = harness("10.0.0.9");
        let grey = solid([120, 120, 120]);
        assert!(matches!(
            h.pipeline.process_frame(&grey, Instant::now()).await,
            FrameOutcome::NoMatch { .. }
        ));

        h.config.write().await.selectors =
            vec![crate::detection::Selector::new(9, "grey", Color::new(128, 128, 128), 20.0, 0)];
        assert!(matches!(
            h.pipeline.process_frame(&grey, Instant::now()).await,
            FrameOutcome::Matched { selector_id: 9, .. }
        ));
    }
}
