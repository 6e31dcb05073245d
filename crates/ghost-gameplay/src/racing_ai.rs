//! Obstacle-avoiding autopilot for the racer.

use crate::racing::{RacingAction, RacingWorld};
use crate::world::InputSource;
use serde::{Deserialize, Serialize};

/// Steering thresholds, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Obstacles closer than this (vertically, above the player) are threats
    pub reaction_distance: f32,
    /// Obstacles stay threats until they are this far below the player
    pub pass_margin: f32,
    /// Horizontal offset under which a threat is on a collision course
    pub danger_width: f32,
    /// Band the autopilot steers back into while a threat is near
    pub safe_band: (f32, f32),
    /// Band the autopilot drifts into when nothing threatens
    pub drift_band: (f32, f32),
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            reaction_distance: 250.0,
            pass_margin: 70.0,
            danger_width: 80.0,
            safe_band: (300.0, 500.0),
            drift_band: (380.0, 420.0),
        }
    }
}

/// Drives the racer by steering away from the nearest obstacle that has not
/// yet cleared the player.
#[derive(Debug, Clone, Default)]
pub struct RacingAutopilot {
    config: AutopilotConfig,
}

impl RacingAutopilot {
    /// Creates an autopilot with custom thresholds.
    #[must_use]
    pub fn new(config: AutopilotConfig) -> Self {
        Self { config }
    }

    /// Chooses a steering action for the current world, if any.
    #[must_use]
    pub fn decide(&self, world: &RacingWorld) -> Option<RacingAction> {
        let player = world.player_pos();

        let threat = world
            .obstacles()
            .iter()
            .map(|o| (player.y - o.pos.y, o.pos.x))
            .filter(|(above, _)| *above > -self.config.pass_margin)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .filter(|(above, _)| *above < self.config.reaction_distance);

        match threat {
            Some((_, obstacle_x)) => {
                let dx = player.x - obstacle_x;
                if dx.abs() < self.config.danger_width {
                    Some(if dx > 0.0 {
                        RacingAction::MoveRight
                    } else {
                        RacingAction::MoveLeft
                    })
                } else {
                    Self::steer_into(player.x, self.config.safe_band)
                }
            },
            None => Self::steer_into(player.x, self.config.drift_band),
        }
    }

    fn steer_into(x: f32, (low, high): (f32, f32)) -> Option<RacingAction> {
        if x < low {
            Some(RacingAction::MoveRight)
        } else if x > high {
            Some(RacingAction::MoveLeft)
        } else {
            None
        }
    }
}

impl InputSource<RacingWorld> for RacingAutopilot {
    fn next_actions(&mut self, _tick: u64, world: &RacingWorld) -> Vec<RacingAction> {
        self.decide(world).into_iter().collect()
    }
}
