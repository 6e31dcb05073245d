//! Session state and control surface.

use ghost_common::{GhostResult, ImportError, SessionError};
use ghost_replay::{codec, ActionLog, GameKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// Session State
// ============================================================================

/// What the simulation loop is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Free play under live input, nothing recorded.
    #[default]
    Idle,
    /// Live input, every applied action recorded.
    Recording,
    /// Actions come from a recorded log.
    Replaying,
}

impl SessionState {
    /// Check if a recording or replay is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Recording | Self::Replaying)
    }

    /// Check if live input drives the world.
    #[must_use]
    pub const fn uses_live_input(&self) -> bool {
        matches!(self, Self::Idle | Self::Recording)
    }

    /// Lowercase name, as used in logs and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Replaying => "replaying",
        }
    }

    /// Fails unless idle.
    pub(crate) const fn ensure_idle(self) -> Result<(), SessionError> {
        if self.is_active() {
            Err(SessionError::AlreadyActive {
                state: self.as_str(),
            })
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session Control
// ============================================================================

/// Public control surface of a simulation.
pub trait SessionControl {
    /// Game being simulated.
    type Kind: GameKind;

    /// Current state.
    fn state(&self) -> SessionState;

    /// Starts a fresh recorded session seeded with `seed`.
    fn start_recording(&mut self, seed: u64) -> Result<(), SessionError>;

    /// Starts replaying `log` in a fresh world.
    ///
    /// Returns the seed actually used.
    fn start_replay(
        &mut self,
        log: ActionLog<Self::Kind>,
        seed: Option<u64>,
    ) -> Result<u64, SessionError>;

    /// Ends the active session and returns to idle.
    ///
    /// A finished recording stays available through [`Self::recorded_log`].
    fn stop(&mut self);

    /// The current or most recent recording.
    fn recorded_log(&self) -> Option<&ActionLog<Self::Kind>>;

    /// Serializes the current or most recent recording. Empty if nothing was
    /// recorded.
    fn export_log(&self) -> GhostResult<String> {
        match self.recorded_log() {
            Some(log) => codec::serialize(log),
            None => codec::serialize(&ActionLog::<Self::Kind>::new()),
        }
    }

    /// Parses a log for this game.
    fn import_log(&self, text: &str) -> Result<ActionLog<Self::Kind>, ImportError> {
        codec::deserialize(text)
    }
}

/// Picks the seed for a replay.
///
/// The explicit seed wins, then the log's seed, then the game default. Two
/// different seeds are a mismatch.
pub fn resolve_replay_seed<G: GameKind>(
    log: &ActionLog<G>,
    requested: Option<u64>,
) -> Result<u64, SessionError> {
    match (requested, log.seed()) {
        (Some(requested), Some(recorded)) if requested != recorded => {
            Err(SessionError::SeedMismatch {
                recorded,
                requested,
            })
        },
        (Some(seed), _) | (None, Some(seed)) => Ok(seed),
        (None, None) => Ok(G::DEFAULT_SEED),
    }
}
