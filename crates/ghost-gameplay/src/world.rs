//! Game world abstraction.
//!
//! A [`GameWorld`] owns every entity of one game and knows how to apply that
//! game's actions. Spawning is decided separately by a [`WorldGenerator`],
//! which sees only the tick number and the seeded random source, so world
//! generation never depends on player input.

use ghost_common::{EntityIdAllocator, SeededRandom};
use ghost_replay::GameKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Action type of a world's game.
pub type ActionOf<W> = <<W as GameWorld>::Kind as GameKind>::Action;

/// Snapshot type of a world's game.
pub type SnapshotOf<W> = <<W as GameWorld>::Kind as GameKind>::Snapshot;

/// Spawn command type of a world's generator.
pub type SpawnOf<W> = <<W as GameWorld>::Generator as WorldGenerator>::Spawn;

/// Decides what appears in the world on each tick.
pub trait WorldGenerator: Debug {
    /// Command describing one entity to instantiate.
    type Spawn: Clone + Debug + PartialEq;

    /// Returns the spawns due on `tick`, drawing from `rng` only.
    fn on_tick(&self, tick: u64, rng: &mut SeededRandom) -> Vec<Self::Spawn>;
}

/// Whether a spawn cadence of `interval` ticks fires on `tick`.
///
/// Tick 0 never fires; an interval of 0 disables the cadence.
#[must_use]
pub const fn is_due(tick: u64, interval: u64) -> bool {
    interval > 0 && tick > 0 && tick % interval == 0
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The player hit an obstacle without a shield.
    Crashed {
        /// Final score
        score: u64,
    },
}

/// Mutable state of one game.
pub trait GameWorld: Debug {
    /// Action vocabulary and snapshot shape.
    type Kind: GameKind;
    /// Spawn schedule for this world.
    type Generator: WorldGenerator;

    /// Builds the generator matching this world's configuration.
    fn generator(&self) -> Self::Generator;

    /// Returns to the initial state of a new session.
    fn reset(&mut self);

    /// Instantiates a spawned entity.
    fn spawn(&mut self, spawn: SpawnOf<Self>, ids: &mut EntityIdAllocator);

    /// Applies one player intent.
    fn apply(&mut self, action: ActionOf<Self>);

    /// Advances entities, resolves collisions and scoring.
    ///
    /// Outcome records (for example a collected coin) are pushed to
    /// `markers`. Returns an outcome when the game is over.
    fn advance(&mut self, markers: &mut Vec<ActionOf<Self>>) -> Option<GameOutcome>;

    /// Observable state for recording and display.
    fn snapshot(&self) -> SnapshotOf<Self>;
}

/// Supplies live actions for a tick.
pub trait InputSource<W: GameWorld> {
    /// Returns the actions the player (or an autopilot) takes on `tick`.
    fn next_actions(&mut self, tick: u64, world: &W) -> Vec<ActionOf<W>>;
}

impl<W, F> InputSource<W> for F
where
    W: GameWorld,
    F: FnMut(u64, &W) -> Vec<ActionOf<W>>,
{
    fn next_actions(&mut self, tick: u64, world: &W) -> Vec<ActionOf<W>> {
        self(tick, world)
    }
}

/// Input source that never acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl<W: GameWorld> InputSource<W> for NoInput {
    fn next_actions(&mut self, _tick: u64, _world: &W) -> Vec<ActionOf<W>> {
        Vec::new()
    }
}

/// Deterministic per-tick input script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedInput<A> {
    script: BTreeMap<u64, Vec<A>>,
}

impl<A> Default for ScriptedInput<A> {
    fn default() -> Self {
        Self {
            script: BTreeMap::new(),
        }
    }
}

impl<A: Copy> ScriptedInput<A> {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Performs `action` on `tick`.
    #[must_use]
    pub fn at(mut self, tick: u64, action: A) -> Self {
        self.script.entry(tick).or_default().push(action);
        self
    }

    /// Holds `action` on every tick in `ticks`.
    #[must_use]
    pub fn hold(mut self, ticks: std::ops::Range<u64>, action: A) -> Self {
        for tick in ticks {
            self.script.entry(tick).or_default().push(action);
        }
        self
    }

    /// Performs `action` every `interval` ticks, starting at `first`, up to
    /// (excluding) `until`.
    #[must_use]
    pub fn every(mut self, first: u64, interval: u64, until: u64, action: A) -> Self {
        let mut tick = first;
        while tick < until && interval > 0 {
            self.script.entry(tick).or_default().push(action);
            tick += interval;
        }
        self
    }

    /// Last tick with a scripted action.
    #[must_use]
    pub fn last_tick(&self) -> Option<u64> {
        self.script.keys().next_back().copied()
    }

    /// Actions scripted for `tick`.
    #[must_use]
    pub fn actions_at(&self, tick: u64) -> &[A] {
        self.script.get(&tick).map_or(&[], Vec::as_slice)
    }
}

impl<W> InputSource<W> for ScriptedInput<ActionOf<W>>
where
    W: GameWorld,
{
    fn next_actions(&mut self, tick: u64, _world: &W) -> Vec<ActionOf<W>> {
        self.actions_at(tick).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_builders() {
        let script = ScriptedInput::new()
            .at(3, 'x')
            .hold(1..3, 'h')
            .every(0, 2, 5, 'e');

        assert_eq!(script.actions_at(0), &['e']);
        assert_eq!(script.actions_at(1), &['h']);
        assert_eq!(script.actions_at(2), &['h', 'e']);
        assert_eq!(script.actions_at(3), &['x']);
        assert_eq!(script.actions_at(4), &['e']);
        assert!(script.actions_at(5).is_empty());
        assert_eq!(script.last_tick(), Some(4));
    }

    #[test]
    fn test_is_due() {
        assert!(!is_due(0, 30));
        assert!(is_due(30, 30));
        assert!(!is_due(31, 30));
        assert!(!is_due(30, 0));
    }

    #[test]
    fn test_every_with_zero_interval_is_empty() {
        let script = ScriptedInput::new().every(0, 0, 10, 1u8);
        assert_eq!(script.last_tick(), None);
    }
}
