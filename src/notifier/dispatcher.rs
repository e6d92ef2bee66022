use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::detection::state::SharedState;
use crate::notifier::signal::Signal;
use crate::notifier::tcp_notifier::ActuatorNotifier;

/// Sends a signal and logs the outcome. Failures are not retried.
pub async fn deliver(notifier: &dyn ActuatorNotifier, address: &str, signal: Signal) -> bool {
    match notifier.send(address, signal).await {
        Ok(()) => {
            info!("Delivered {} signal to {}", signal, address);
            true
        }
        Err(e) => {
            warn!("Dropped {} signal to {}: {}", signal, address, e);
            false
        }
    }
}

/// Runs network sends off the detection path.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn ActuatorNotifier>,
    state: SharedState,
    shutdown: CancellationToken,
}

impl NotificationDispatcher {
    pub fn new(
        notifier: Arc<dyn ActuatorNotifier>,
        state: SharedState,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            notifier,
            state,
            shutdown,
        }
    }

    pub fn dispatch_primary(&self, address: String) -> JoinHandle<bool> {
        let notifier = self.notifier.clone();
        tokio::spawn(async move { deliver(notifier.as_ref(), &address, Signal::Primary).await })
    }

    /// One-shot deferred send at `fire_at`. The caller must already hold the
    /// scheduler's pending flag; this task releases it when it finishes,
    /// whether the send succeeded, failed or was cancelled by shutdown.
    pub fn schedule_secondary(&self, address: String, fire_at: Instant) -> JoinHandle<bool> {
        let notifier = self.notifier.clone();
        let state = self.state.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let delivered = tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Secondary signal to {} cancelled by shutdown", address);
                    false
                }
                _ = tokio::time::sleep_until(fire_at) => {
                    deliver(notifier.as_ref(), &address, Signal::Secondary).await
                }
            };
            state.lock().await.scheduler.secondary_finished();
            delivered
        })
    }
}
