//! # Ghostline Gameplay
//!
//! Game rule-sets and the simulation loop that records and replays them.
//!
//! This crate provides:
//! - The [`GameWorld`] / [`WorldGenerator`] abstractions
//! - A lane racer ([`RacingWorld`]) with an autopilot driver
//! - A strategy game ([`StrategyWorld`]) driven by a generated market signal
//! - [`SimulationLoop`], the tick driver with its `Idle` / `Recording` /
//!   `Replaying` session state machine
//! - Wall-clock sources for live and test use

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod racing;
pub mod racing_ai;
pub mod session;
pub mod simulation;
pub mod strategy;
pub mod world;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::racing::{
        PowerUpKind, RacingAction, RacingConfig, RacingGame, RacingSnapshot, RacingSpawn,
        RacingWorld,
    };
    pub use crate::racing_ai::{AutopilotConfig, RacingAutopilot};
    pub use crate::session::{resolve_replay_seed, SessionControl, SessionState};
    pub use crate::simulation::{ReportOf, SimulationLoop, TickReport};
    pub use crate::strategy::{
        Stance, StrategyAction, StrategyConfig, StrategyGame, StrategySnapshot, StrategyWorld,
    };
    pub use crate::world::{
        ActionOf, GameOutcome, GameWorld, InputSource, NoInput, ScriptedInput, SnapshotOf,
        WorldGenerator,
    };
}

pub use prelude::*;
