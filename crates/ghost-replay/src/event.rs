//! Recorded events and the action log.

use crate::action::GameKind;
use ghost_common::ImportError;
use serde::{Deserialize, Serialize};

/// A single recorded intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "camelCase")]
pub struct ActionEvent<G: GameKind> {
    /// Wall-clock milliseconds at capture
    pub timestamp: i64,
    /// What the player (or autopilot) did
    pub action: G::Action,
    /// Observable state when the action was captured
    #[serde(default)]
    pub game_state: G::Snapshot,
}

impl<G: GameKind> ActionEvent<G> {
    /// Creates a new event.
    #[must_use]
    pub fn new(timestamp: i64, action: G::Action, game_state: G::Snapshot) -> Self {
        Self {
            timestamp,
            action,
            game_state,
        }
    }
}

/// Ordered, timestamped record of one session's actions.
///
/// Timestamps never decrease. Only [`crate::ActionRecorder`] appends to a
/// log; once exported or handed to a [`crate::ReplayScheduler`] it is never
/// modified again.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLog<G: GameKind> {
    events: Vec<ActionEvent<G>>,
    seed: Option<u64>,
    started_at: Option<i64>,
}

impl<G: GameKind> Default for ActionLog<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GameKind> ActionLog<G> {
    /// Creates an empty log without metadata.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            seed: None,
            started_at: None,
        }
    }

    /// Builds a log from already-ordered events.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::OutOfOrder`] if a timestamp decreases.
    pub fn from_events(events: Vec<ActionEvent<G>>) -> Result<Self, ImportError> {
        check_order(&events)?;
        Ok(Self {
            events,
            seed: None,
            started_at: None,
        })
    }

    /// Attaches the seed the recording was made with.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Attaches the wall-clock time the recording started at.
    #[must_use]
    pub fn with_started_at(mut self, started_at: Option<i64>) -> Self {
        self.started_at = started_at;
        self
    }

    pub(crate) fn push(&mut self, event: ActionEvent<G>) {
        debug_assert!(self
            .events
            .last()
            .map_or(true, |last| last.timestamp <= event.timestamp));
        self.events.push(event);
    }

    /// All events in recording order.
    #[must_use]
    pub fn events(&self) -> &[ActionEvent<G>] {
        &self.events
    }

    /// Returns the event at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ActionEvent<G>> {
        self.events.get(index)
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over events in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, ActionEvent<G>> {
        self.events.iter()
    }

    /// Seed the recording used, if the log carries one.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Wall-clock time the recording started, if known.
    #[must_use]
    pub const fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    /// Local time origin for replay scheduling.
    ///
    /// The recording start when known, otherwise the first event's timestamp.
    #[must_use]
    pub fn origin(&self) -> Option<i64> {
        self.started_at
            .or_else(|| self.events.first().map(|e| e.timestamp))
    }

    /// Milliseconds between the origin and the last event.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        match (self.origin(), self.events.last()) {
            (Some(origin), Some(last)) => last.timestamp.saturating_sub(origin),
            _ => 0,
        }
    }

    /// Number of events carrying `action`.
    #[must_use]
    pub fn count_of(&self, action: G::Action) -> usize {
        self.events.iter().filter(|e| e.action == action).count()
    }
}

impl<'a, G: GameKind> IntoIterator for &'a ActionLog<G> {
    type Item = &'a ActionEvent<G>;
    type IntoIter = std::slice::Iter<'a, ActionEvent<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

pub(crate) fn check_order<G: GameKind>(events: &[ActionEvent<G>]) -> Result<(), ImportError> {
    for (index, pair) in events.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            return Err(ImportError::OutOfOrder {
                index: index + 1,
                previous: pair[0].timestamp,
                timestamp: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::test_game::{Move, Pos, Shooter};

    fn event(timestamp: i64, action: Move) -> ActionEvent<Shooter> {
        ActionEvent::new(timestamp, action, Pos::default())
    }

    #[test]
    fn test_from_events_accepts_equal_timestamps() {
        let log = ActionLog::<Shooter>::from_events(vec![
            event(10, Move::Left),
            event(10, Move::Right),
            event(25, Move::Fire),
        ])
        .expect("ordered");
        assert_eq!(log.len(), 3);
        assert_eq!(log.count_of(Move::Left), 1);
    }

    #[test]
    fn test_from_events_rejects_decreasing() {
        let err = ActionLog::<Shooter>::from_events(vec![event(10, Move::Left), event(5, Move::Left)])
            .expect_err("out of order");
        assert_eq!(
            err,
            ImportError::OutOfOrder {
                index: 1,
                previous: 10,
                timestamp: 5
            }
        );
    }

    #[test]
    fn test_origin_prefers_started_at() {
        let log = ActionLog::<Shooter>::from_events(vec![event(100, Move::Left), event(160, Move::Left)])
            .expect("ordered");
        assert_eq!(log.origin(), Some(100));
        assert_eq!(log.duration_ms(), 60);

        let log = log.with_started_at(Some(40));
        assert_eq!(log.origin(), Some(40));
        assert_eq!(log.duration_ms(), 120);
    }

    #[test]
    fn test_duration_saturates_on_extreme_span() {
        let log = ActionLog::<Shooter>::from_events(vec![
            event(i64::MIN, Move::Left),
            event(i64::MAX, Move::Right),
        ])
        .expect("ordered");
        assert_eq!(log.duration_ms(), i64::MAX);
    }

    #[test]
    fn test_empty_log_has_no_origin() {
        let log = ActionLog::<Shooter>::new();
        assert!(log.is_empty());
        assert_eq!(log.origin(), None);
        assert_eq!(log.duration_ms(), 0);
    }

    #[test]
    fn test_event_json_uses_camel_case() {
        let json = serde_json::to_string(&event(1, Move::Right)).expect("serialize");
        assert!(json.contains("\"gameState\""));
        assert!(json.contains("\"right\""));
    }
}
