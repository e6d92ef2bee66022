use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::config::DetectionSettings;

/// Timing windows applied to accepted triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimings {
    pub cooldown: Duration,
    pub suppression: Duration,
    pub secondary_delay: Duration,
}

impl Default for DebounceTimings {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(750),
            suppression: Duration::from_secs(20),
            secondary_delay: Duration::from_secs(5),
        }
    }
}

impl From<&DetectionSettings> for DebounceTimings {
    fn from(settings: &DetectionSettings) -> Self {
        Self {
            cooldown: Duration::from_millis(settings.cooldown_ms),
            suppression: Duration::from_secs(settings.suppression_secs),
            secondary_delay: Duration::from_secs(settings.secondary_delay_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// Inside the suppression window of an earlier trigger.
    Suppressed,
    /// Too soon after the last primary signal.
    CoolingDown,
    /// Send the primary signal now; schedule the secondary if asked.
    Fire { schedule_secondary: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    Cooldown,
    Suppressed,
}

/// Turns a stream of match events into rate-limited triggers.
///
/// The primary window (cooldown, then suppression) and the pending-secondary
/// flag are independent: the flag only guards against a second deferred task
/// while one is outstanding.
#[derive(Debug, Clone)]
pub struct DebounceScheduler {
    timings: DebounceTimings,
    last_signal_sent_at: Option<Instant>,
    suppress_until: Option<Instant>,
    secondary_pending: bool,
}

impl Default for DebounceScheduler {
    fn default() -> Self {
        Self::new(DebounceTimings::default())
    }
}

impl DebounceScheduler {
    pub fn new(timings: DebounceTimings) -> Self {
        Self {
            timings,
            last_signal_sent_at: None,
            suppress_until: None,
            secondary_pending: false,
        }
    }

    pub fn timings(&self) -> DebounceTimings {
        self.timings
    }

    pub fn on_match(&mut self, now: Instant) -> TriggerDecision {
        if self.suppress_until.is_some_and(|until| now < until) {
            return TriggerDecision::Suppressed;
        }
        if self
            .last_signal_sent_at
            .is_some_and(|last| now.saturating_duration_since(last) < self.timings.cooldown)
        {
            return TriggerDecision::CoolingDown;
        }

        self.last_signal_sent_at = Some(now);
        let schedule_secondary = !self.secondary_pending;
        self.secondary_pending = true;

        let until = now + self.timings.suppression;
        self.suppress_until = Some(self.suppress_until.map_or(until, |prev| prev.max(until)));

        TriggerDecision::Fire { schedule_secondary }
    }

    /// Called by the deferred task once it has sent (or failed to send).
    pub fn secondary_finished(&mut self) {
        self.secondary_pending = false;
    }

    pub fn secondary_pending(&self) -> bool {
        self.secondary_pending
    }

    pub fn last_signal_sent_at(&self) -> Option<Instant> {
        self.last_signal_sent_at
    }

    pub fn suppress_until(&self) -> Option<Instant> {
        self.suppress_until
    }

    pub fn phase(&self, now: Instant) -> SchedulerPhase {
        if self.suppress_until.is_some_and(|until| now < until) {
            SchedulerPhase::Suppressed
        } else if self
            .last_signal_sent_at
            .is_some_and(|last| now.saturating_duration_since(last) < self.timings.cooldown)
        {
            SchedulerPhase::Cooldown
        } else {
            SchedulerPhase::Idle
        }
    }
}
