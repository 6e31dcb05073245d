//! # Ghostline Replay
//!
//! Recording and replaying per-game action logs.
//!
//! - [`ActionRecorder`] captures timestamped actions with state snapshots
//! - [`codec`] moves logs to and from their JSON interchange form
//! - [`ReplayScheduler`] feeds a recorded log back into a simulation,
//!   tick by tick, against the wall clock
//!
//! Everything is generic over a [`GameKind`], which fixes the action
//! vocabulary and snapshot shape of one game.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod action;
pub mod codec;
pub mod event;
pub mod recorder;
pub mod scheduler;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{ActionTag, GameKind, ReplayPolicy};
    pub use crate::event::{ActionEvent, ActionLog};
    pub use crate::recorder::{ActionRecorder, RecordingConfig};
    pub use crate::scheduler::{applied_actions, ReplayScheduler, ReplayStep};
}

pub use prelude::*;
