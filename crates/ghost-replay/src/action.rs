//! Per-game action vocabularies.
//!
//! Each game declares a closed set of action tags and a snapshot type through
//! [`GameKind`]. The replay machinery is generic over that declaration, so a
//! racing log can never be fed into a strategy simulation by accident.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// How a recorded action is re-applied during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplayPolicy {
    /// A continuously held intent, recorded once per tick while held.
    /// Only the most recent hold in a catch-up window is applied.
    Hold,
    /// A discrete intent. Every due event is applied exactly once.
    Instant,
    /// An outcome record kept for telemetry. Consumed, never applied.
    Marker,
}

/// A closed set of action tags for one game.
pub trait ActionTag: Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static {
    /// Every recognized action, in declaration order.
    const ALL: &'static [Self];

    /// The interchange tag for this action (e.g. `"move_left"`).
    fn tag(self) -> &'static str;

    /// Replay policy for this action.
    fn policy(self) -> ReplayPolicy;

    /// Looks up an action by its interchange tag.
    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|action| action.tag() == tag)
    }
}

/// Declares a game's action vocabulary, snapshot shape and default seed.
///
/// Implemented by zero-sized marker types.
pub trait GameKind: Debug + Clone + Copy + PartialEq + Eq + Default + 'static {
    /// Name written into exported logs and checked on import.
    const NAME: &'static str;

    /// Seed used for both recording and replay when none is given.
    const DEFAULT_SEED: u64;

    /// The game's action tags.
    type Action: ActionTag;

    /// Observable state captured alongside each recorded action.
    type Snapshot: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned;
}

#[cfg(test)]
pub(crate) mod test_game {
    //! A tiny game used by this crate's unit tests.

    use super::{ActionTag, GameKind, ReplayPolicy};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Move {
        Left,
        Right,
        Fire,
        Hit,
    }

    impl ActionTag for Move {
        const ALL: &'static [Self] = &[Self::Left, Self::Right, Self::Fire, Self::Hit];

        fn tag(self) -> &'static str {
            match self {
                Self::Left => "left",
                Self::Right => "right",
                Self::Fire => "fire",
                Self::Hit => "hit",
            }
        }

        fn policy(self) -> ReplayPolicy {
            match self {
                Self::Left | Self::Right => ReplayPolicy::Hold,
                Self::Fire => ReplayPolicy::Instant,
                Self::Hit => ReplayPolicy::Marker,
            }
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Pos {
        pub x: i32,
        pub heading: f64,
    }

    impl Pos {
        pub fn at(x: i32) -> Self {
            Self { x, heading: 0.0 }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Shooter;

    impl GameKind for Shooter {
        const NAME: &'static str = "shooter";
        const DEFAULT_SEED: u64 = 7;
        type Action = Move;
        type Snapshot = Pos;
    }
}
