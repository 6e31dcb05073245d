//! Record, export, re-import and replay one session, then compare.
//!
//! The harness records a session with the configured input, writes the
//! exported log to disk, reads it back, replays it on a fresh loop with the
//! recorded seed and checks that every tick applied the same actions and that
//! both runs end in the same state.

use crate::config::{GameChoice, HarnessConfig, InputChoice};
use crate::timing::TickPacer;
use ghost_common::{GhostError, ImportError, SessionError};
use ghost_gameplay::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Harness failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The configured input source does not exist for the game.
    #[error("Input `{input:?}` is not available for {game}")]
    UnsupportedInput {
        /// Selected game
        game: &'static str,
        /// Selected input
        input: InputChoice,
    },

    /// Log file could not be written or read back.
    #[error("Log file {path}: {source}")]
    LogFile {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Export failed.
    #[error(transparent)]
    Export(#[from] GhostError),

    /// The written log did not import.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A session could not start.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Outcome of one harness run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarnessReport {
    /// Game played
    pub game: &'static str,
    /// Seed used by both runs
    pub seed: u64,
    /// Ticks recorded
    pub ticks: u64,
    /// Events in the exported log
    pub events: usize,
    /// Where the log was written
    pub log_path: PathBuf,
    /// How the recording ended, if the game ended
    pub outcome: Option<GameOutcome>,
    /// First tick whose applied actions differ between the runs
    pub first_divergence: Option<u64>,
    /// Whether both runs ended in the same snapshot
    pub snapshots_match: bool,
}

impl HarnessReport {
    /// Whether the replay reproduced the recording.
    #[must_use]
    pub fn verified(&self) -> bool {
        self.first_divergence.is_none() && self.snapshots_match
    }
}

/// Tick driver: simulated time or the wall clock.
enum Pacing {
    Simulated(ManualClock, i64),
    Realtime(TickPacer),
}

impl Pacing {
    fn step(&mut self) {
        match self {
            Self::Simulated(clock, tick_ms) => clock.advance(*tick_ms),
            Self::Realtime(pacer) => pacer.wait(),
        }
    }
}

/// Runs the full record / export / import / replay cycle.
pub fn run(config: &HarnessConfig) -> Result<HarnessReport, HarnessError> {
    let seed = config.resolved_seed();
    info!(
        game = config.game.as_str(),
        seed,
        input = ?config.input,
        max_ticks = config.max_ticks,
        realtime = config.realtime,
        "Harness starting"
    );

    match config.game {
        GameChoice::Racing => {
            let world = || RacingWorld::new(config.racing.clone());
            match config.input {
                InputChoice::Scripted => {
                    let mut script = racing_script(config.max_ticks);
                    run_game(config, seed, world, &mut script)
                },
                InputChoice::Autopilot => {
                    let mut autopilot = RacingAutopilot::new(config.autopilot.clone());
                    run_game(config, seed, world, &mut autopilot)
                },
                InputChoice::Idle => run_game(config, seed, world, &mut NoInput),
            }
        },
        GameChoice::Strategy => {
            let world = || StrategyWorld::new(config.strategy.clone());
            match config.input {
                InputChoice::Scripted => {
                    let mut script = strategy_script(config.max_ticks);
                    run_game(config, seed, world, &mut script)
                },
                InputChoice::Autopilot => Err(HarnessError::UnsupportedInput {
                    game: GameChoice::Strategy.as_str(),
                    input: InputChoice::Autopilot,
                }),
                InputChoice::Idle => run_game(config, seed, world, &mut NoInput),
            }
        },
    }
}

/// Weaves left and right in repeating 200-tick phrases.
#[must_use]
pub fn racing_script(ticks: u64) -> ScriptedInput<RacingAction> {
    let mut script = ScriptedInput::new();
    let mut start = 1;
    while start <= ticks {
        script = script
            .hold(start..start + 40, RacingAction::MoveLeft)
            .hold(start + 60..start + 140, RacingAction::MoveRight)
            .hold(start + 160..start + 200, RacingAction::MoveLeft);
        start += 200;
    }
    script
}

/// Replans every 45 ticks, predicts just after each market signal and
/// executes every 7 ticks.
#[must_use]
pub fn strategy_script(ticks: u64) -> ScriptedInput<StrategyAction> {
    ScriptedInput::new()
        .every(5, 45, ticks + 1, StrategyAction::Plan)
        .every(31, 30, ticks + 1, StrategyAction::Predict)
        .every(10, 7, ticks + 1, StrategyAction::Execute)
}

struct Run<W: GameWorld> {
    applied: Vec<Vec<ActionOf<W>>>,
    snapshot: SnapshotOf<W>,
    outcome: Option<GameOutcome>,
}

fn drive<W: GameWorld, C: Clock>(
    sim: &mut SimulationLoop<W, C>,
    pacing: &mut Pacing,
    input: &mut impl InputSource<W>,
    ticks: u64,
) -> Run<W> {
    let mut applied = Vec::new();
    for _ in 0..ticks {
        if sim.outcome().is_some() {
            break;
        }
        pacing.step();
        applied.push(sim.tick(input).applied);
    }
    Run {
        applied,
        snapshot: sim.snapshot(),
        outcome: sim.outcome(),
    }
}

fn run_game<W: GameWorld>(
    config: &HarnessConfig,
    seed: u64,
    world: impl Fn() -> W,
    input: &mut impl InputSource<W>,
) -> Result<HarnessReport, HarnessError> {
    if config.realtime {
        let mut pacing = Pacing::Realtime(TickPacer::new(config.tick_ms));
        let report = cycle(config, seed, &world, input, SystemClock, &mut pacing)?;
        if let Pacing::Realtime(pacer) = &pacing {
            info!(
                average_tick_ms = pacer.average_tick_ms(),
                overruns = pacer.overruns(),
                "Realtime pacing"
            );
        }
        Ok(report)
    } else {
        let clock = ManualClock::new(0);
        let mut pacing = Pacing::Simulated(clock.clone(), config.tick_ms as i64);
        cycle(config, seed, &world, input, clock, &mut pacing)
    }
}

fn cycle<W: GameWorld, C: Clock + Clone>(
    config: &HarnessConfig,
    seed: u64,
    world: &impl Fn() -> W,
    input: &mut impl InputSource<W>,
    clock: C,
    pacing: &mut Pacing,
) -> Result<HarnessReport, HarnessError> {
    let mut recorder = SimulationLoop::new(world(), clock.clone());
    recorder.start_recording(seed)?;
    let recorded = drive(&mut recorder, pacing, input, config.max_ticks);
    recorder.stop();

    let text = recorder.export_log()?;
    write_log(&config.log_path, &text)?;

    let text = fs::read_to_string(&config.log_path).map_err(|source| HarnessError::LogFile {
        path: config.log_path.clone(),
        source,
    })?;
    let log = recorder.import_log(&text)?;
    let events = log.len();
    debug!(events, bytes = text.len(), "Log read back");

    if let Pacing::Realtime(pacer) = pacing {
        pacer.reset();
    }

    let mut player = SimulationLoop::new(world(), clock);
    player.start_replay(log, Some(seed))?;
    let ticks = recorded.applied.len() as u64;
    let replayed = drive(&mut player, pacing, &mut NoInput, ticks);

    let common = recorded.applied.len().min(replayed.applied.len());
    let first_divergence = recorded
        .applied
        .iter()
        .zip(&replayed.applied)
        .position(|(a, b)| a != b)
        .or((recorded.applied.len() != replayed.applied.len()).then_some(common))
        .map(|index| index as u64 + 1);
    let snapshots_match = recorded.snapshot == replayed.snapshot;

    if let Some(tick) = first_divergence {
        warn!(tick, "Replay diverged from the recording");
    }
    if !snapshots_match {
        warn!(
            recorded = ?recorded.snapshot,
            replayed = ?replayed.snapshot,
            "Final snapshots differ"
        );
    }
    if recorded.outcome != replayed.outcome {
        warn!(
            recorded = ?recorded.outcome,
            replayed = ?replayed.outcome,
            "Outcomes differ"
        );
    }

    Ok(HarnessReport {
        game: config.game.as_str(),
        seed,
        ticks,
        events,
        log_path: config.log_path.clone(),
        outcome: recorded.outcome,
        first_divergence,
        snapshots_match,
    })
}

fn write_log(path: &Path, text: &str) -> Result<(), HarnessError> {
    let io_err = |source| HarnessError::LogFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, text).map_err(io_err)?;

    info!(path = %path.display(), bytes = text.len(), "Action log written");
    Ok(())
}
