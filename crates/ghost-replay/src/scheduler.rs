//! Wall-clock driven replay of an action log.

use crate::action::{ActionTag, GameKind, ReplayPolicy};
use crate::event::ActionLog;
use std::ops::Range;
use tracing::debug;

/// What one poll of the scheduler produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep<A> {
    /// Log indices consumed by this poll
    pub consumed: Range<usize>,
    /// Actions to apply this tick, in log order
    pub actions: Vec<A>,
    /// Whether the log is exhausted
    pub finished: bool,
}

impl<A> ReplayStep<A> {
    /// Whether this poll consumed nothing and applies nothing.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.consumed.is_empty() && self.actions.is_empty()
    }
}

/// Decides which recorded actions are due at a given wall-clock instant.
///
/// The cursor only ever moves forward. Every event is consumed exactly once.
/// Which consumed events are actually applied depends on each action's
/// [`ReplayPolicy`]:
///
/// - `Hold`: only the last hold in the window is applied, at its position;
/// - `Instant`: all are applied, in order;
/// - `Marker`: none are applied.
#[derive(Debug)]
pub struct ReplayScheduler<G: GameKind> {
    log: ActionLog<G>,
    start_time: i64,
    origin: i64,
    cursor: usize,
    finish_logged: bool,
}

impl<G: GameKind> ReplayScheduler<G> {
    /// Takes ownership of `log` and starts replaying it at wall-clock `start_time`.
    #[must_use]
    pub fn new(log: ActionLog<G>, start_time: i64) -> Self {
        let origin = log.origin().unwrap_or(0);
        if log.is_empty() {
            debug!(game = G::NAME, "Replaying an empty action log");
        }
        Self {
            log,
            start_time,
            origin,
            cursor: 0,
            finish_logged: false,
        }
    }

    /// Consumes every event due at `now` and returns the actions to apply.
    pub fn poll(&mut self, now: i64) -> ReplayStep<G::Action> {
        let elapsed = now.saturating_sub(self.start_time).max(0);
        let begin = self.cursor;

        while let Some(event) = self.log.get(self.cursor) {
            if event.timestamp.saturating_sub(self.origin) > elapsed {
                break;
            }
            self.cursor += 1;
        }

        let consumed = begin..self.cursor;
        let actions = self.select(consumed.clone());
        let finished = self.is_finished();

        if finished && !self.finish_logged {
            self.finish_logged = true;
            debug!(
                game = G::NAME,
                events = self.log.len(),
                elapsed_ms = elapsed,
                "Replay finished"
            );
        }

        ReplayStep {
            consumed,
            actions,
            finished,
        }
    }

    fn select(&self, window: Range<usize>) -> Vec<G::Action> {
        applied_actions(self.log.events()[window].iter().map(|e| e.action))
    }

    /// Index of the next event to be consumed.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of events in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether the log has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Events not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.log.len() - self.cursor
    }

    /// Whether every event has been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.log.len()
    }

    /// Fraction of the log consumed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.log.is_empty() {
            1.0
        } else {
            self.cursor as f32 / self.log.len() as f32
        }
    }

    /// Wall-clock instant the replay started at.
    #[must_use]
    pub const fn start_time(&self) -> i64 {
        self.start_time
    }

    /// The log being replayed.
    #[must_use]
    pub fn log(&self) -> &ActionLog<G> {
        &self.log
    }

    /// Gives the log back, ending the replay.
    #[must_use]
    pub fn into_log(self) -> ActionLog<G> {
        self.log
    }
}

/// Reduces one tick's worth of actions to those that should take effect.
///
/// The last `Hold` is kept at its position among the `Instant`s. Markers are
/// dropped. Applied to live input as well as to each replay window.
pub fn applied_actions<A: ActionTag>(actions: impl IntoIterator<Item = A>) -> Vec<A> {
    let mut applied = Vec::new();
    let mut held: Option<(usize, A)> = None;

    for action in actions {
        match action.policy() {
            ReplayPolicy::Hold => held = Some((applied.len(), action)),
            ReplayPolicy::Instant => applied.push(action),
            ReplayPolicy::Marker => {},
        }
    }

    if let Some((position, action)) = held {
        applied.insert(position, action);
    }
    applied
}
