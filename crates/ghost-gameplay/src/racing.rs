//! Lane racer.
//!
//! The player drives along the bottom of an 800x600 field while obstacles,
//! coins and power-ups fall towards them. Coins score points and build a
//! streak multiplier; power-ups grant a speed drop, an extra multiplier or a
//! one-hit shield; hitting an obstacle without a shield ends the run.

use crate::world::{is_due, GameOutcome, GameWorld, WorldGenerator};
use ghost_common::{EntityId, EntityIdAllocator, SeededRandom};
use ghost_replay::{ActionTag, GameKind, ReplayPolicy};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Actions and snapshot
// ============================================================================

/// Racing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacingAction {
    /// Steer left, recorded every tick while held.
    MoveLeft,
    /// Steer right, recorded every tick while held.
    MoveRight,
    /// A coin was picked up.
    Collect,
    /// A coin left the field uncollected.
    Avoid,
}

impl ActionTag for RacingAction {
    const ALL: &'static [Self] = &[Self::MoveLeft, Self::MoveRight, Self::Collect, Self::Avoid];

    fn tag(self) -> &'static str {
        match self {
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::Collect => "collect",
            Self::Avoid => "avoid",
        }
    }

    fn policy(self) -> ReplayPolicy {
        match self {
            Self::MoveLeft | Self::MoveRight => ReplayPolicy::Hold,
            Self::Collect | Self::Avoid => ReplayPolicy::Marker,
        }
    }
}

/// State recorded with each racing action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacingSnapshot {
    /// Player x position
    pub position: f32,
    /// Current score
    pub score: u64,
    /// Current fall speed
    pub speed: f32,
    /// Obstacles on the field
    pub obstacles: usize,
}

/// The racing game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RacingGame;

impl GameKind for RacingGame {
    const NAME: &'static str = "racing";
    const DEFAULT_SEED: u64 = 12_345;
    type Action = RacingAction;
    type Snapshot = RacingSnapshot;
}

// ============================================================================
// Configuration
// ============================================================================

/// Racing tuning, in pixels and 60 Hz ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacingConfig {
    /// Player y position (fixed)
    pub player_y: f32,
    /// Player x at the start of a session
    pub player_start_x: f32,
    /// Player bounds
    pub player_size: Vec2,
    /// Leftmost player x
    pub player_min_x: f32,
    /// Rightmost player x
    pub player_max_x: f32,
    /// Pixels moved per steering tick
    pub move_step: f32,
    /// Fall speed at session start
    pub start_speed: f32,
    /// Fall speed added every tick
    pub speed_ramp: f32,
    /// Fall speed after a speed boost expires
    pub min_speed: f32,
    /// Entities below this y are removed
    pub despawn_y: f32,
    /// Obstacle bounds
    pub obstacle_size: Vec2,
    /// Coin radius
    pub coin_radius: f32,
    /// Power-up bounds
    pub power_up_size: Vec2,
    /// Ticks between obstacle spawns
    pub obstacle_interval: u64,
    /// Ticks between coin spawns
    pub coin_interval: u64,
    /// Ticks between power-up windows
    pub power_up_interval: u64,
    /// Chance a power-up window spawns one
    pub power_up_chance: f64,
    /// Obstacle and coin spawn x range
    pub lane_x: (i32, i32),
    /// Power-up spawn x range
    pub power_up_x: (i32, i32),
    /// Obstacle and coin spawn y
    pub spawn_y: f32,
    /// Power-up spawn y
    pub power_up_spawn_y: f32,
    /// Ticks a power-up stays active
    pub power_up_duration: u32,
    /// Base points for a coin
    pub coin_points: u64,
    /// Streak length that raises the multiplier
    pub streak_step: u32,
    /// Multiplier cap
    pub max_multiplier: f32,
    /// Score per level
    pub level_score: u64,
}

impl Default for RacingConfig {
    fn default() -> Self {
        Self {
            player_y: 500.0,
            player_start_x: 400.0,
            player_size: Vec2::new(50.0, 80.0),
            player_min_x: 100.0,
            player_max_x: 700.0,
            move_step: 6.0,
            start_speed: 5.0,
            speed_ramp: 0.001,
            min_speed: 2.0,
            despawn_y: 650.0,
            obstacle_size: Vec2::new(60.0, 60.0),
            coin_radius: 15.0,
            power_up_size: Vec2::new(35.0, 35.0),
            obstacle_interval: 90,
            coin_interval: 120,
            power_up_interval: 300,
            power_up_chance: 0.3,
            lane_x: (150, 650),
            power_up_x: (300, 500),
            spawn_y: -50.0,
            power_up_spawn_y: -30.0,
            power_up_duration: 600,
            coin_points: 100,
            streak_step: 10,
            max_multiplier: 5.0,
            level_score: 500,
        }
    }
}

impl RacingConfig {
    /// Repairs values that would make steering ill-defined.
    ///
    /// Non-finite steering values fall back to their defaults and reversed
    /// player bounds are swapped.
    pub fn validate(&mut self) {
        let defaults = Self::default();
        for (value, fallback) in [
            (&mut self.player_min_x, defaults.player_min_x),
            (&mut self.player_max_x, defaults.player_max_x),
            (&mut self.player_start_x, defaults.player_start_x),
            (&mut self.move_step, defaults.move_step),
        ] {
            if !value.is_finite() {
                *value = fallback;
            }
        }
        if self.player_min_x > self.player_max_x {
            std::mem::swap(&mut self.player_min_x, &mut self.player_max_x);
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Power-up effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Lowers the fall speed; on expiry the speed drops to the minimum.
    SpeedBoost,
    /// Adds one to the score multiplier.
    Multiplier,
    /// Absorbs one obstacle hit.
    Shield,
}

impl PowerUpKind {
    /// Maps a `between(0, 2)` roll to a kind.
    #[must_use]
    pub const fn from_roll(roll: i32) -> Self {
        match roll {
            0 => Self::SpeedBoost,
            1 => Self::Multiplier,
            _ => Self::Shield,
        }
    }
}

/// Something that appears at the top of the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RacingSpawn {
    /// A barrier to avoid.
    Obstacle {
        /// Spawn position
        at: Vec2,
    },
    /// A coin to collect.
    Coin {
        /// Spawn position
        at: Vec2,
    },
    /// A power-up to collect.
    PowerUp {
        /// Spawn position
        at: Vec2,
        /// Effect granted on pickup
        kind: PowerUpKind,
    },
}

/// A falling obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Session-local id
    pub id: EntityId,
    /// Center position
    pub pos: Vec2,
}

/// A falling coin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    /// Session-local id
    pub id: EntityId,
    /// Center position
    pub pos: Vec2,
}

/// A falling power-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUp {
    /// Session-local id
    pub id: EntityId,
    /// Center position
    pub pos: Vec2,
    /// Effect granted on pickup
    pub kind: PowerUpKind,
}

/// The power-up currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePowerUp {
    /// Which effect
    pub kind: PowerUpKind,
    /// Ticks until it expires
    pub remaining: u32,
}

// ============================================================================
// Generator
// ============================================================================

/// Spawn schedule for the racer.
///
/// Per due tick the draw order is: obstacle x, coin x, power-up gate, then
/// power-up x and kind only when the gate passes.
#[derive(Debug, Clone)]
pub struct RacingGenerator {
    obstacle_interval: u64,
    coin_interval: u64,
    power_up_interval: u64,
    power_up_chance: f64,
    lane_x: (i32, i32),
    power_up_x: (i32, i32),
    spawn_y: f32,
    power_up_spawn_y: f32,
}

impl RacingGenerator {
    /// Builds the schedule from a racing configuration.
    #[must_use]
    pub fn new(config: &RacingConfig) -> Self {
        Self {
            obstacle_interval: config.obstacle_interval,
            coin_interval: config.coin_interval,
            power_up_interval: config.power_up_interval,
            power_up_chance: config.power_up_chance,
            lane_x: config.lane_x,
            power_up_x: config.power_up_x,
            spawn_y: config.spawn_y,
            power_up_spawn_y: config.power_up_spawn_y,
        }
    }
}

impl WorldGenerator for RacingGenerator {
    type Spawn = RacingSpawn;

    fn on_tick(&self, tick: u64, rng: &mut SeededRandom) -> Vec<RacingSpawn> {
        let mut spawns = Vec::new();

        if is_due(tick, self.obstacle_interval) {
            let x = rng.between(self.lane_x.0, self.lane_x.1);
            spawns.push(RacingSpawn::Obstacle {
                at: Vec2::new(x as f32, self.spawn_y),
            });
        }

        if is_due(tick, self.coin_interval) {
            let x = rng.between(self.lane_x.0, self.lane_x.1);
            spawns.push(RacingSpawn::Coin {
                at: Vec2::new(x as f32, self.spawn_y),
            });
        }

        // One gate draw per window, whether or not it spawns.
        if is_due(tick, self.power_up_interval) && rng.chance(self.power_up_chance) {
            let x = rng.between(self.power_up_x.0, self.power_up_x.1);
            let kind = PowerUpKind::from_roll(rng.between(0, 2));
            spawns.push(RacingSpawn::PowerUp {
                at: Vec2::new(x as f32, self.power_up_spawn_y),
                kind,
            });
        }

        spawns
    }
}

// ============================================================================
// World
// ============================================================================

fn overlaps(a: Vec2, a_size: Vec2, b: Vec2, b_size: Vec2) -> bool {
    let gap = (a - b).abs();
    let reach = (a_size + b_size) * 0.5;
    gap.x < reach.x && gap.y < reach.y
}

/// Racing world state.
#[derive(Debug, Clone)]
pub struct RacingWorld {
    config: RacingConfig,
    player_x: f32,
    speed: f32,
    score: u64,
    multiplier: f32,
    combo: u32,
    streak: u32,
    level: u32,
    obstacles: Vec<Obstacle>,
    coins: Vec<Coin>,
    power_ups: Vec<PowerUp>,
    active: Option<ActivePowerUp>,
    crashed: bool,
}

impl Default for RacingWorld {
    fn default() -> Self {
        Self::new(RacingConfig::default())
    }
}

impl RacingWorld {
    /// Creates a world at its session-start state.
    #[must_use]
    pub fn new(mut config: RacingConfig) -> Self {
        config.validate();
        Self {
            player_x: config.player_start_x,
            speed: config.start_speed,
            score: 0,
            multiplier: 1.0,
            combo: 0,
            streak: 0,
            level: 1,
            obstacles: Vec::new(),
            coins: Vec::new(),
            power_ups: Vec::new(),
            active: None,
            crashed: false,
            config,
        }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &RacingConfig {
        &self.config
    }

    /// Player center.
    #[must_use]
    pub fn player_pos(&self) -> Vec2 {
        Vec2::new(self.player_x, self.config.player_y)
    }

    /// Current fall speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Score multiplier applied to coins.
    #[must_use]
    pub const fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Coins collected since the last missed coin.
    #[must_use]
    pub const fn combo(&self) -> u32 {
        self.combo
    }

    /// Coins collected this session.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Current level, starting at 1.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Obstacles on the field.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Coins on the field.
    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Power-ups on the field.
    #[must_use]
    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    /// The power-up in effect, if any.
    #[must_use]
    pub const fn active_power_up(&self) -> Option<ActivePowerUp> {
        self.active
    }

    /// Whether the run ended on an obstacle.
    #[must_use]
    pub const fn is_crashed(&self) -> bool {
        self.crashed
    }

    fn shielded(&self) -> bool {
        matches!(
            self.active,
            Some(ActivePowerUp {
                kind: PowerUpKind::Shield,
                ..
            })
        )
    }

    fn steer(&mut self, dx: f32) {
        self.player_x = (self.player_x + dx)
            .max(self.config.player_min_x)
            .min(self.config.player_max_x);
    }

    fn collect_coin(&mut self) {
        self.score += (self.config.coin_points as f32 * self.multiplier).floor() as u64;
        self.combo += 1;
        self.streak += 1;
        if self.config.streak_step > 0 && self.streak % self.config.streak_step == 0 {
            self.multiplier = (self.multiplier + 0.5).min(self.config.max_multiplier);
            debug!(streak = self.streak, multiplier = self.multiplier, "Streak bonus");
        }
    }

    fn activate(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::SpeedBoost => self.speed = (self.speed - 0.5).max(self.config.min_speed),
            PowerUpKind::Multiplier => {
                self.multiplier = (self.multiplier + 1.0).min(self.config.max_multiplier);
            },
            PowerUpKind::Shield => {},
        }
        self.active = Some(ActivePowerUp {
            kind,
            remaining: self.config.power_up_duration,
        });
    }

    fn tick_power_up(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.remaining = active.remaining.saturating_sub(1);
        if active.remaining == 0 {
            if active.kind == PowerUpKind::SpeedBoost {
                self.speed = self.config.min_speed;
            }
            self.active = None;
        }
    }

    fn move_obstacles(&mut self) -> bool {
        let player = self.player_pos();
        let fall = Vec2::new(0.0, self.speed * 2.0);
        let mut index = 0;
        while index < self.obstacles.len() {
            self.obstacles[index].pos += fall;
            let pos = self.obstacles[index].pos;

            if overlaps(player, self.config.player_size, pos, self.config.obstacle_size) {
                if !self.shielded() {
                    return true;
                }
                self.obstacles.remove(index);
                self.active = None;
                debug!("Shield absorbed an obstacle");
                continue;
            }
            if pos.y > self.config.despawn_y {
                self.obstacles.remove(index);
                continue;
            }
            index += 1;
        }
        false
    }

    fn move_coins(&mut self, markers: &mut Vec<RacingAction>) {
        let player = self.player_pos();
        let fall = Vec2::new(0.0, self.speed * 2.0);
        let coin_size = Vec2::splat(self.config.coin_radius * 2.0);
        let mut index = 0;
        while index < self.coins.len() {
            self.coins[index].pos += fall;
            let pos = self.coins[index].pos;

            if overlaps(player, self.config.player_size, pos, coin_size) {
                self.coins.remove(index);
                self.collect_coin();
                markers.push(RacingAction::Collect);
                continue;
            }
            if pos.y > self.config.despawn_y {
                self.coins.remove(index);
                self.combo = 0;
                markers.push(RacingAction::Avoid);
                continue;
            }
            index += 1;
        }
    }

    fn move_power_ups(&mut self) {
        let player = self.player_pos();
        let fall = Vec2::new(0.0, self.speed);
        let mut index = 0;
        while index < self.power_ups.len() {
            self.power_ups[index].pos += fall;
            let power_up = self.power_ups[index];

            if overlaps(player, self.config.player_size, power_up.pos, self.config.power_up_size) {
                self.power_ups.remove(index);
                self.activate(power_up.kind);
                continue;
            }
            if power_up.pos.y > self.config.despawn_y {
                self.power_ups.remove(index);
                continue;
            }
            index += 1;
        }
    }
}

impl GameWorld for RacingWorld {
    type Kind = RacingGame;
    type Generator = RacingGenerator;

    fn generator(&self) -> RacingGenerator {
        RacingGenerator::new(&self.config)
    }

    fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    fn spawn(&mut self, spawn: RacingSpawn, ids: &mut EntityIdAllocator) {
        let id = ids.allocate();
        match spawn {
            RacingSpawn::Obstacle { at } => self.obstacles.push(Obstacle { id, pos: at }),
            RacingSpawn::Coin { at } => self.coins.push(Coin { id, pos: at }),
            RacingSpawn::PowerUp { at, kind } => self.power_ups.push(PowerUp { id, pos: at, kind }),
        }
    }

    fn apply(&mut self, action: RacingAction) {
        match action {
            RacingAction::MoveLeft => self.steer(-self.config.move_step),
            RacingAction::MoveRight => self.steer(self.config.move_step),
            RacingAction::Collect | RacingAction::Avoid => {},
        }
    }

    fn advance(&mut self, markers: &mut Vec<RacingAction>) -> Option<GameOutcome> {
        if self.crashed {
            return Some(GameOutcome::Crashed { score: self.score });
        }

        self.tick_power_up();

        if self.move_obstacles() {
            self.crashed = true;
            return Some(GameOutcome::Crashed { score: self.score });
        }
        self.move_coins(markers);
        self.move_power_ups();

        self.speed += self.config.speed_ramp;

        let level = (self.score / self.config.level_score.max(1)) as u32 + 1;
        if level > self.level {
            self.level = level;
            debug!(level, score = self.score, "Level up");
        }
        None
    }

    fn snapshot(&self) -> RacingSnapshot {
        RacingSnapshot {
            position: self.player_x,
            score: self.score,
            speed: self.speed,
            obstacles: self.obstacles.len(),
        }
    }
}
