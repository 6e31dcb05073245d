//! Business strategy game.
//!
//! The player cycles between three stances, executes them against a rotating
//! set of case studies, and predicts a market signal that the world generator
//! refreshes on a fixed cadence.

use crate::world::{is_due, GameOutcome, GameWorld, WorldGenerator};
use ghost_common::{EntityId, EntityIdAllocator, SeededRandom};
use ghost_replay::{ActionTag, GameKind, ReplayPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Strategy actions. All are discrete button presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyAction {
    /// Switch to the next stance.
    Plan,
    /// Execute the current stance against the current case.
    Execute,
    /// Predict the market signal.
    Predict,
}

impl ActionTag for StrategyAction {
    const ALL: &'static [Self] = &[Self::Plan, Self::Execute, Self::Predict];

    fn tag(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Execute => "execute",
            Self::Predict => "predict",
        }
    }

    fn policy(self) -> ReplayPolicy {
        ReplayPolicy::Instant
    }
}

/// State recorded with each strategy action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySnapshot {
    /// Stance index (0 aggressive, 1 balanced, 2 defensive)
    pub strategy: u8,
    /// Current market signal
    pub prediction: f64,
    /// Current score
    pub score: u64,
    /// Current level
    pub level: u32,
}

/// The strategy game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrategyGame;

impl GameKind for StrategyGame {
    const NAME: &'static str = "strategy";
    const DEFAULT_SEED: u64 = 54_321;
    type Action = StrategyAction;
    type Snapshot = StrategySnapshot;
}

/// How the player approaches a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stance {
    /// High risk, highest base points.
    #[default]
    Aggressive,
    /// Middle ground.
    Balanced,
    /// Low risk.
    Defensive,
}

impl Stance {
    /// Base points of the stance, before level and case bonuses.
    #[must_use]
    pub const fn base_points(self) -> u64 {
        match self {
            Self::Aggressive => 50,
            Self::Balanced => 75,
            Self::Defensive => 100,
        }
    }

    /// The stance `plan` switches to.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Aggressive => Self::Balanced,
            Self::Balanced => Self::Defensive,
            Self::Defensive => Self::Aggressive,
        }
    }

    /// Index used in snapshots.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Aggressive => 0,
            Self::Balanced => 1,
            Self::Defensive => 2,
        }
    }
}

/// A scenario to work through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseStudy {
    /// Display name
    pub name: &'static str,
    /// Case target is `difficulty * case_target` points
    pub difficulty: u64,
    /// Stance that earns the bonus
    pub optimal: Stance,
    /// Points factor for executing the optimal stance
    pub bonus: f64,
}

/// The case rotation.
pub static CASE_STUDIES: [CaseStudy; 5] = [
    CaseStudy {
        name: "Market Volatility",
        difficulty: 1,
        optimal: Stance::Balanced,
        bonus: 1.2,
    },
    CaseStudy {
        name: "Bull Market",
        difficulty: 1,
        optimal: Stance::Aggressive,
        bonus: 1.5,
    },
    CaseStudy {
        name: "Bear Market",
        difficulty: 2,
        optimal: Stance::Defensive,
        bonus: 1.3,
    },
    CaseStudy {
        name: "Crisis Management",
        difficulty: 3,
        optimal: Stance::Defensive,
        bonus: 2.0,
    },
    CaseStudy {
        name: "Growth Phase",
        difficulty: 2,
        optimal: Stance::Aggressive,
        bonus: 1.8,
    },
];

/// Strategy tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Ticks between market signals
    pub signal_interval: u64,
    /// Points per level added to every execution
    pub level_bonus: u64,
    /// Case points needed per difficulty step
    pub case_target: u64,
    /// Score per level needed to level up after an execution
    pub level_score: u64,
    /// Prediction threshold at level zero
    pub prediction_threshold: f64,
    /// Threshold added per level
    pub prediction_threshold_step: f64,
    /// Reward for a correct prediction at level zero
    pub prediction_reward: u64,
    /// Reward added per level
    pub prediction_reward_step: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            signal_interval: 30,
            level_bonus: 10,
            case_target: 500,
            level_score: 200,
            prediction_threshold: 50.0,
            prediction_threshold_step: 5.0,
            prediction_reward: 30,
            prediction_reward_step: 5,
        }
    }
}

/// A market reading, refreshed by the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSignal {
    /// Session-local id
    pub id: EntityId,
    /// Value in `[0, 100)`
    pub value: f64,
}

/// A new market reading to publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSpawn {
    /// Value in `[0, 100)`
    pub value: f64,
}

/// Publishes one market signal every `interval` ticks.
#[derive(Debug, Clone)]
pub struct MarketGenerator {
    interval: u64,
}

impl MarketGenerator {
    /// Creates a generator with the given cadence.
    #[must_use]
    pub const fn new(interval: u64) -> Self {
        Self { interval }
    }
}

impl WorldGenerator for MarketGenerator {
    type Spawn = MarketSpawn;

    fn on_tick(&self, tick: u64, rng: &mut SeededRandom) -> Vec<MarketSpawn> {
        if is_due(tick, self.interval) {
            vec![MarketSpawn {
                value: rng.next() * 100.0,
            }]
        } else {
            Vec::new()
        }
    }
}

/// Strategy world state.
#[derive(Debug, Clone)]
pub struct StrategyWorld {
    config: StrategyConfig,
    stance: Stance,
    executions: u32,
    case_index: usize,
    case_score: u64,
    cases_completed: u32,
    score: u64,
    level: u32,
    signal: Option<MarketSignal>,
    total_predictions: u32,
    correct_predictions: u32,
}

impl Default for StrategyWorld {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}

impl StrategyWorld {
    /// Creates a world at its session-start state.
    #[must_use]
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            stance: Stance::default(),
            executions: 0,
            case_index: 0,
            case_score: 0,
            cases_completed: 0,
            score: 0,
            level: 1,
            signal: None,
            total_predictions: 0,
            correct_predictions: 0,
        }
    }

    /// Current stance.
    #[must_use]
    pub const fn stance(&self) -> Stance {
        self.stance
    }

    /// Current case.
    #[must_use]
    pub fn case(&self) -> &'static CaseStudy {
        &CASE_STUDIES[self.case_index % CASE_STUDIES.len()]
    }

    /// Points earned towards the current case.
    #[must_use]
    pub const fn case_score(&self) -> u64 {
        self.case_score
    }

    /// Cases finished this session.
    #[must_use]
    pub const fn cases_completed(&self) -> u32 {
        self.cases_completed
    }

    /// Executions this session.
    #[must_use]
    pub const fn executions(&self) -> u32 {
        self.executions
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Current level, starting at 1.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Latest market signal.
    #[must_use]
    pub const fn signal(&self) -> Option<MarketSignal> {
        self.signal
    }

    /// Fraction of correct predictions, 0 when none were made.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_predictions == 0 {
            0.0
        } else {
            f64::from(self.correct_predictions) / f64::from(self.total_predictions)
        }
    }

    fn signal_value(&self) -> f64 {
        self.signal.map_or(0.0, |s| s.value)
    }

    fn execute(&mut self) {
        let case = *self.case();
        let bonus = if self.stance == case.optimal {
            case.bonus
        } else {
            1.0
        };
        let base = self.stance.base_points() + u64::from(self.level) * self.config.level_bonus;
        let points = (base as f64 * bonus).floor() as u64;

        self.score += points;
        self.case_score += points;
        self.executions += 1;

        if self.case_score >= case.difficulty * self.config.case_target {
            self.case_index = (self.case_index + 1) % CASE_STUDIES.len();
            self.case_score = 0;
            self.cases_completed += 1;
            debug!(case = case.name, next = self.case().name, "Case completed");
        }

        if self.score >= u64::from(self.level) * self.config.level_score {
            self.level += 1;
            debug!(level = self.level, score = self.score, "Level up");
        }
    }

    fn predict(&mut self) {
        self.total_predictions += 1;
        let level = f64::from(self.level);
        let threshold =
            self.config.prediction_threshold + level * self.config.prediction_threshold_step;
        if self.signal_value() > threshold {
            self.correct_predictions += 1;
            self.score += self.config.prediction_reward
                + u64::from(self.level) * self.config.prediction_reward_step;
        }
    }
}

impl GameWorld for StrategyWorld {
    type Kind = StrategyGame;
    type Generator = MarketGenerator;

    fn generator(&self) -> MarketGenerator {
        MarketGenerator::new(self.config.signal_interval)
    }

    fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    fn spawn(&mut self, spawn: MarketSpawn, ids: &mut EntityIdAllocator) {
        self.signal = Some(MarketSignal {
            id: ids.allocate(),
            value: spawn.value,
        });
    }

    fn apply(&mut self, action: StrategyAction) {
        match action {
            StrategyAction::Plan => self.stance = self.stance.next(),
            StrategyAction::Execute => self.execute(),
            StrategyAction::Predict => self.predict(),
        }
    }

    fn advance(&mut self, _markers: &mut Vec<StrategyAction>) -> Option<GameOutcome> {
        None
    }

    fn snapshot(&self) -> StrategySnapshot {
        StrategySnapshot {
            strategy: self.stance.index(),
            prediction: self.signal_value(),
            score: self.score,
            level: self.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_signal(value: f64) -> StrategyWorld {
        let mut world = StrategyWorld::default();
        world.spawn(MarketSpawn { value }, &mut EntityIdAllocator::new());
        world
    }

    #[test]
    fn test_plan_cycles_stances() {
        let mut world = StrategyWorld::default();
        assert_eq!(world.stance(), Stance::Aggressive);
        world.apply(StrategyAction::Plan);
        assert_eq!(world.stance(), Stance::Balanced);
        world.apply(StrategyAction::Plan);
        world.apply(StrategyAction::Plan);
        assert_eq!(world.stance(), Stance::Aggressive);
    }

    #[test]
    fn test_execute_with_optimal_stance_gets_bonus() {
        let mut world = StrategyWorld::default();
        world.apply(StrategyAction::Plan);
        world.apply(StrategyAction::Execute);
        // (75 + 1 * 10) * 1.2
        assert_eq!(world.score(), 102);
        assert_eq!(world.executions(), 1);
    }

    #[test]
    fn test_execute_without_bonus_and_level_up() {
        let mut world = StrategyWorld::default();
        world.apply(StrategyAction::Execute);
        assert_eq!(world.score(), 60);
        assert_eq!(world.level(), 1);

        for _ in 0..3 {
            world.apply(StrategyAction::Execute);
        }
        assert_eq!(world.score(), 240);
        assert_eq!(world.level(), 2);
    }

    #[test]
    fn test_case_completion_rotates_case() {
        let mut world = StrategyWorld::default();
        world.apply(StrategyAction::Plan);
        while world.cases_completed() == 0 {
            world.apply(StrategyAction::Execute);
        }
        assert_eq!(world.case().name, "Bull Market");
        assert_eq!(world.case_score(), 0);
    }

    #[test]
    fn test_prediction_threshold() {
        let mut world = with_signal(55.0);
        world.apply(StrategyAction::Predict);
        assert_eq!(world.score(), 0);
        assert!(world.accuracy().abs() < f64::EPSILON);

        let mut world = with_signal(56.0);
        world.apply(StrategyAction::Predict);
        assert_eq!(world.score(), 35);
        assert!((world.accuracy() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_market_generator_cadence() {
        let generator = MarketGenerator::new(30);
        let mut rng = SeededRandom::new(3);
        let spawned: Vec<u64> = (0..=120)
            .filter(|&tick| !generator.on_tick(tick, &mut rng).is_empty())
            .collect();
        assert_eq!(spawned, vec![30, 60, 90, 120]);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut world = with_signal(42.5);
        world.apply(StrategyAction::Plan);
        world.apply(StrategyAction::Plan);
        let snapshot = world.snapshot();
        assert_eq!(snapshot.strategy, 2);
        assert!((snapshot.prediction - 42.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.level, 1);
    }

    #[test]
    fn test_all_actions_are_instant() {
        for action in StrategyAction::ALL {
            assert_eq!(action.policy(), ReplayPolicy::Instant);
        }
    }
}
