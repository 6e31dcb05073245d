//! Fixed-cadence simulation driver.
//!
//! One [`SimulationLoop::tick`] call runs, in order:
//! 1. world generation and spawning,
//! 2. choosing the tick's actions (live input, or the replay scheduler),
//! 3. applying them,
//! 4. advancing entities and resolving collisions,
//! 5. recording applied actions and outcome markers while recording.

use crate::clock::Clock;
use crate::session::{resolve_replay_seed, SessionControl, SessionState};
use crate::world::{ActionOf, GameOutcome, GameWorld, InputSource, SnapshotOf, WorldGenerator};
use ghost_common::{EntityIdAllocator, SeededRandom, SessionError};
use ghost_replay::{
    applied_actions, ActionLog, ActionRecorder, GameKind, RecordingConfig, ReplayScheduler,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport<A, S> {
    /// Tick number within the session, starting at 1
    pub tick: u64,
    /// Session state after the tick
    pub state: SessionState,
    /// Entities spawned this tick
    pub spawned: usize,
    /// Actions applied this tick, in order
    pub applied: Vec<A>,
    /// Outcome records produced this tick
    pub markers: Vec<A>,
    /// Set once the game is over
    pub outcome: Option<GameOutcome>,
    /// The replay consumed its last event this tick
    pub replay_finished: bool,
    /// State after the tick
    pub snapshot: S,
}

/// Tick report for a world type.
pub type ReportOf<W> = TickReport<ActionOf<W>, SnapshotOf<W>>;

/// Drives one game world through idle play, recording and replay.
#[derive(Debug)]
pub struct SimulationLoop<W: GameWorld, C: Clock> {
    world: W,
    generator: W::Generator,
    clock: C,
    rng: SeededRandom,
    ids: EntityIdAllocator,
    tick: u64,
    state: SessionState,
    recording_config: RecordingConfig,
    recorder: Option<ActionRecorder<W::Kind>>,
    scheduler: Option<ReplayScheduler<W::Kind>>,
    last_recording: Option<ActionLog<W::Kind>>,
    outcome: Option<GameOutcome>,
}

impl<W: GameWorld, C: Clock> SimulationLoop<W, C> {
    /// Creates an idle loop around `world`, seeded with the game's default.
    pub fn new(world: W, clock: C) -> Self {
        let generator = world.generator();
        Self {
            world,
            generator,
            clock,
            rng: SeededRandom::new(<W::Kind as GameKind>::DEFAULT_SEED),
            ids: EntityIdAllocator::new(),
            tick: 0,
            state: SessionState::Idle,
            recording_config: RecordingConfig::default(),
            recorder: None,
            scheduler: None,
            last_recording: None,
            outcome: None,
        }
    }

    /// Sets the configuration used by future recordings.
    #[must_use]
    pub fn with_recording_config(mut self, config: RecordingConfig) -> Self {
        self.recording_config = config;
        self
    }

    /// The world being simulated.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Current observable state.
    pub fn snapshot(&self) -> SnapshotOf<W> {
        self.world.snapshot()
    }

    /// Ticks run since the session started.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Seed of the current session's random source.
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Random draws made this session.
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }

    /// How the last game ended, while the world is frozen.
    pub const fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Fraction of the replay consumed, while replaying.
    pub fn replay_progress(&self) -> Option<f32> {
        self.scheduler.as_ref().map(ReplayScheduler::progress)
    }

    /// The clock driving timestamps.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs one tick.
    ///
    /// `input` is consulted while idle or recording and ignored while
    /// replaying. Once the game is over the world stays frozen and every
    /// further tick reports the outcome until a new session starts.
    pub fn tick(&mut self, input: &mut impl InputSource<W>) -> ReportOf<W> {
        if let Some(outcome) = self.outcome {
            return self.report(0, Vec::new(), Vec::new(), Some(outcome), false);
        }

        self.tick += 1;
        let now = self.clock.now_ms();

        let spawns = self.generator.on_tick(self.tick, &mut self.rng);
        let spawned = spawns.len();
        for spawn in spawns {
            self.world.spawn(spawn, &mut self.ids);
        }

        let (applied, replay_finished) = match self.scheduler.as_mut() {
            Some(scheduler) => {
                let step = scheduler.poll(now);
                (step.actions, step.finished)
            },
            None => (
                applied_actions(input.next_actions(self.tick, &self.world)),
                false,
            ),
        };

        for &action in &applied {
            self.world.apply(action);
        }

        let mut markers = Vec::new();
        let outcome = self.world.advance(&mut markers);

        if let Some(recorder) = self.recorder.as_mut() {
            let snapshot = self.world.snapshot();
            for &action in applied.iter().chain(&markers) {
                recorder.record(now, action, snapshot.clone());
            }
        }

        if replay_finished {
            info!(
                game = <W::Kind as GameKind>::NAME,
                tick = self.tick,
                "Replay finished"
            );
            self.end_session();
        }

        if let Some(outcome) = outcome {
            info!(
                game = <W::Kind as GameKind>::NAME,
                tick = self.tick,
                ?outcome,
                "Game over"
            );
            self.outcome = Some(outcome);
            self.end_session();
        }

        self.report(spawned, applied, markers, outcome, replay_finished)
    }

    fn report(
        &self,
        spawned: usize,
        applied: Vec<ActionOf<W>>,
        markers: Vec<ActionOf<W>>,
        outcome: Option<GameOutcome>,
        replay_finished: bool,
    ) -> ReportOf<W> {
        TickReport {
            tick: self.tick,
            state: self.state,
            spawned,
            applied,
            markers,
            outcome,
            replay_finished,
            snapshot: self.world.snapshot(),
        }
    }

    fn fresh_session(&mut self, seed: u64) {
        self.world.reset();
        self.generator = self.world.generator();
        self.rng = SeededRandom::new(seed);
        self.ids = EntityIdAllocator::new();
        self.tick = 0;
        self.outcome = None;
    }

    fn end_session(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            self.last_recording = Some(recorder.finish());
        }
        self.scheduler = None;
        self.state = SessionState::Idle;
    }
}

impl<W: GameWorld, C: Clock> SessionControl for SimulationLoop<W, C> {
    type Kind = W::Kind;

    fn state(&self) -> SessionState {
        self.state
    }

    fn start_recording(&mut self, seed: u64) -> Result<(), SessionError> {
        self.state.ensure_idle()?;
        self.fresh_session(seed);

        let started_at = self.clock.now_ms();
        self.recorder = Some(ActionRecorder::with_config(
            seed,
            started_at,
            self.recording_config.clone(),
        ));
        self.last_recording = None;
        self.state = SessionState::Recording;

        info!(
            game = <W::Kind as GameKind>::NAME,
            seed, started_at, "Recording started"
        );
        Ok(())
    }

    fn start_replay(
        &mut self,
        log: ActionLog<W::Kind>,
        seed: Option<u64>,
    ) -> Result<u64, SessionError> {
        self.state.ensure_idle()?;
        let seed = resolve_replay_seed(&log, seed)?;
        self.fresh_session(seed);

        let start_time = self.clock.now_ms();
        info!(
            game = <W::Kind as GameKind>::NAME,
            seed,
            events = log.len(),
            "Replay started"
        );
        self.scheduler = Some(ReplayScheduler::new(log, start_time));
        self.state = SessionState::Replaying;
        Ok(seed)
    }

    fn stop(&mut self) {
        if !self.state.is_active() {
            debug!("Stop requested while idle");
            return;
        }
        info!(
            game = <W::Kind as GameKind>::NAME,
            state = %self.state,
            tick = self.tick,
            "Session stopped"
        );
        self.end_session();
    }

    fn recorded_log(&self) -> Option<&ActionLog<W::Kind>> {
        self.recorder
            .as_ref()
            .map(ActionRecorder::export_log)
            .or(self.last_recording.as_ref())
    }
}
