//! A recorded session, exported and imported again, replays to the same
//! per-tick actions and the same final state.

use ghost_gameplay::prelude::*;
use ghost_replay::ActionLog;

const TICK_MS: i64 = 16;

struct Trace<W: GameWorld> {
    applied: Vec<Vec<ActionOf<W>>>,
    final_snapshot: SnapshotOf<W>,
    outcome: Option<GameOutcome>,
}

fn play<W: GameWorld>(
    sim: &mut SimulationLoop<W, ManualClock>,
    input: &mut impl InputSource<W>,
    ticks: u64,
) -> Trace<W> {
    let mut applied = Vec::new();
    for _ in 0..ticks {
        if sim.outcome().is_some() {
            break;
        }
        sim.clock().advance(TICK_MS);
        applied.push(sim.tick(input).applied);
    }
    Trace {
        applied,
        final_snapshot: sim.snapshot(),
        outcome: sim.outcome(),
    }
}

fn record_then_replay<W: GameWorld>(
    world: impl Fn() -> W,
    seed: u64,
    input: &mut impl InputSource<W>,
    ticks: u64,
) -> (Trace<W>, Trace<W>, ActionLog<W::Kind>) {
    let mut recorder = SimulationLoop::new(world(), ManualClock::new(10_000));
    recorder.start_recording(seed).expect("idle");
    let recorded = play(&mut recorder, input, ticks);
    recorder.stop();

    let text = recorder.export_log().expect("serialize");
    let log = recorder.import_log(&text).expect("round trip");
    assert_eq!(Some(&log), recorder.recorded_log());

    // Different wall clock, same relative timing.
    let mut player = SimulationLoop::new(world(), ManualClock::new(777_000));
    let resolved = player.start_replay(log.clone(), None).expect("idle");
    assert_eq!(resolved, seed);
    let replayed = play(&mut player, &mut NoInput, ticks);

    (recorded, replayed, log)
}

#[test]
fn test_scripted_racing_replays_identically() {
    let mut script = ScriptedInput::new()
        .hold(1..40, RacingAction::MoveLeft)
        .hold(60..140, RacingAction::MoveRight)
        .hold(200..230, RacingAction::MoveLeft);

    let (recorded, replayed, log) =
        record_then_replay(RacingWorld::default, 4242, &mut script, 400);

    assert!(!log.is_empty());
    assert_eq!(log.seed(), Some(4242));
    assert_eq!(recorded.applied, replayed.applied);
    assert_eq!(recorded.final_snapshot, replayed.final_snapshot);
    assert_eq!(recorded.outcome, replayed.outcome);
}

#[test]
fn test_autopilot_racing_replays_identically() {
    let mut autopilot = RacingAutopilot::default();

    let (recorded, replayed, _) =
        record_then_replay(RacingWorld::default, 12_345, &mut autopilot, 1_200);

    assert_eq!(recorded.applied.len(), replayed.applied.len());
    assert_eq!(recorded.applied, replayed.applied);
    assert_eq!(recorded.final_snapshot, replayed.final_snapshot);
}

#[test]
fn test_strategy_replays_identically() {
    let mut script = ScriptedInput::new()
        .every(5, 45, 900, StrategyAction::Plan)
        .every(31, 30, 900, StrategyAction::Predict)
        .every(10, 7, 900, StrategyAction::Execute);

    let (recorded, replayed, log) =
        record_then_replay(StrategyWorld::default, 54_321, &mut script, 900);

    assert!(log.len() > 100);
    assert!(recorded.final_snapshot.score > 0);
    assert_eq!(recorded.applied, replayed.applied);
    assert_eq!(recorded.final_snapshot, replayed.final_snapshot);
}

#[test]
fn test_replay_with_explicit_seed_override_is_rejected() {
    let mut sim = SimulationLoop::new(StrategyWorld::default(), ManualClock::new(0));
    sim.start_recording(1).expect("idle");
    sim.stop();
    let log = sim.recorded_log().cloned().expect("recording kept");

    let err = sim.start_replay(log, Some(2)).unwrap_err();
    assert!(err.to_string().contains("seed"));
    assert_eq!(sim.state(), SessionState::Idle);
}
