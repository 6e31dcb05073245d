//! Live action recording.

use crate::action::GameKind;
use crate::event::{ActionEvent, ActionLog};
use tracing::{debug, warn};

/// Configuration for action recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingConfig {
    /// Maximum events to keep (0 = unlimited)
    pub max_events: usize,
}

/// Captures actions with their timestamps and state snapshots.
///
/// Hold-style actions are expected once per tick while held, so a held
/// direction leaves a continuous trail in the log.
#[derive(Debug)]
pub struct ActionRecorder<G: GameKind> {
    log: ActionLog<G>,
    config: RecordingConfig,
    started_at: i64,
    last_timestamp: Option<i64>,
    dropped: usize,
}

impl<G: GameKind> ActionRecorder<G> {
    /// Starts a recording made with `seed`, beginning at wall-clock `started_at`.
    #[must_use]
    pub fn new(seed: u64, started_at: i64) -> Self {
        Self::with_config(seed, started_at, RecordingConfig::default())
    }

    /// Starts a recording with a custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, started_at: i64, config: RecordingConfig) -> Self {
        debug!(game = G::NAME, seed, started_at, "Recording started");
        Self {
            log: ActionLog::new()
                .with_seed(Some(seed))
                .with_started_at(Some(started_at)),
            config,
            started_at,
            last_timestamp: None,
            dropped: 0,
        }
    }

    /// Appends an event.
    ///
    /// A timestamp earlier than the previous event (or the recording start) is
    /// clamped forward so the log stays ordered.
    pub fn record(&mut self, timestamp: i64, action: G::Action, snapshot: G::Snapshot) {
        if self.config.max_events > 0 && self.log.len() >= self.config.max_events {
            if self.dropped == 0 {
                warn!(
                    game = G::NAME,
                    max_events = self.config.max_events,
                    "Recording event cap reached, dropping further events"
                );
            }
            self.dropped += 1;
            return;
        }

        let floor = self.last_timestamp.unwrap_or(self.started_at);
        let timestamp = timestamp.max(floor);
        self.last_timestamp = Some(timestamp);
        self.log.push(ActionEvent::new(timestamp, action, snapshot));
    }

    /// The log recorded so far, in append order.
    #[must_use]
    pub fn export_log(&self) -> &ActionLog<G> {
        &self.log
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Events discarded because of the event cap.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Ends the recording and returns its log.
    #[must_use]
    pub fn finish(self) -> ActionLog<G> {
        debug!(
            game = G::NAME,
            events = self.log.len(),
            dropped = self.dropped,
            "Recording finished"
        );
        self.log
    }
}
