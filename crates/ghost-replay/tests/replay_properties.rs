//! End-to-end properties of record, export, import and scheduled replay.

use ghost_common::ImportError;
use ghost_replay::codec;
use ghost_replay::prelude::*;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Pad {
    Up,
    Down,
    Jump,
    Landed,
}

impl ActionTag for Pad {
    const ALL: &'static [Self] = &[Self::Up, Self::Down, Self::Jump, Self::Landed];

    fn tag(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Jump => "jump",
            Self::Landed => "landed",
        }
    }

    fn policy(self) -> ReplayPolicy {
        match self {
            Self::Up | Self::Down => ReplayPolicy::Hold,
            Self::Jump => ReplayPolicy::Instant,
            Self::Landed => ReplayPolicy::Marker,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Height {
    y: i32,
    jumps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Platformer;

impl GameKind for Platformer {
    const NAME: &'static str = "platformer";
    const DEFAULT_SEED: u64 = 1;
    type Action = Pad;
    type Snapshot = Height;
}

fn record(start: i64, events: &[(i64, Pad)]) -> ActionLog<Platformer> {
    let mut recorder = ActionRecorder::<Platformer>::new(99, start);
    for &(t, action) in events {
        recorder.record(t, action, Height::default());
    }
    recorder.finish()
}

#[test]
fn test_catch_up_scenario() {
    let log = record(
        0,
        &[(0, Pad::Jump), (100, Pad::Jump), (100, Pad::Jump), (250, Pad::Jump)],
    );
    let mut scheduler = ReplayScheduler::new(log, 5_000);

    let first = scheduler.poll(5_000);
    let second = scheduler.poll(5_120);
    let third = scheduler.poll(5_260);

    assert_eq!(first.consumed, 0..1);
    assert_eq!(second.consumed, 1..3);
    assert_eq!(third.consumed, 3..4);
    assert_eq!(
        first.actions.len() + second.actions.len() + third.actions.len(),
        4
    );
    assert!(third.finished);
}

#[test]
fn test_catch_up_applies_later_hold() {
    let log = record(
        0,
        &[(0, Pad::Jump), (100, Pad::Up), (100, Pad::Down), (250, Pad::Jump)],
    );
    let mut scheduler = ReplayScheduler::new(log, 5_000);

    let first = scheduler.poll(5_000);
    let second = scheduler.poll(5_120);
    let third = scheduler.poll(5_260);

    assert_eq!(first.actions, vec![Pad::Jump]);
    assert_eq!(second.consumed, 1..3);
    assert_eq!(second.actions, vec![Pad::Down]);
    assert_eq!(third.actions, vec![Pad::Jump]);
    assert!(third.finished);
}

#[test]
fn test_end_of_log_is_stable() {
    let mut scheduler = ReplayScheduler::new(record(0, &[(0, Pad::Up)]), 0);
    scheduler.poll(0);
    for now in (0..1_000).step_by(16) {
        let step = scheduler.poll(now);
        assert!(step.finished);
        assert!(step.actions.is_empty());
        assert!(step.consumed.is_empty());
    }
}

#[test]
fn test_import_rejections() {
    assert_eq!(
        codec::deserialize::<Platformer>("{}"),
        Err(ImportError::NotAnArray)
    );
    assert!(matches!(
        codec::deserialize::<Platformer>(r#"[{"timestamp":1}]"#),
        Err(ImportError::MissingField { index: 0, .. })
    ));
    assert!(matches!(
        codec::deserialize::<Platformer>(r#"[{"timestamp":1,"action":"fly"}]"#),
        Err(ImportError::UnknownAction { index: 0, .. })
    ));
}

#[test]
fn test_empty_log_through_codec_and_scheduler() {
    let text = codec::serialize(&record(10, &[])).expect("serialize");
    let log = codec::deserialize::<Platformer>(&text).expect("deserialize");
    assert!(log.is_empty());

    let mut scheduler = ReplayScheduler::new(log, 0);
    let step = scheduler.poll(0);
    assert!(step.finished);
    assert!(step.actions.is_empty());
}

#[test]
fn test_imported_log_replays_like_recorded_log() {
    let events = [
        (1_000, Pad::Up),
        (1_016, Pad::Up),
        (1_016, Pad::Jump),
        (1_032, Pad::Down),
        (1_048, Pad::Landed),
    ];
    let original = record(1_000, &events);
    let text = codec::serialize(&original).expect("serialize");
    let imported = codec::deserialize::<Platformer>(&text).expect("deserialize");

    let mut a = ReplayScheduler::new(original, 0);
    let mut b = ReplayScheduler::new(imported, 0);
    for now in (0..80).step_by(8) {
        assert_eq!(a.poll(now), b.poll(now));
    }
}

fn arb_pad() -> impl Strategy<Value = Pad> {
    prop_oneof![
        Just(Pad::Up),
        Just(Pad::Down),
        Just(Pad::Jump),
        Just(Pad::Landed)
    ]
}

proptest! {
    #[test]
    fn prop_every_event_consumed_once(
        gaps in proptest::collection::vec((0i64..40, arb_pad()), 0..100),
        polls in proptest::collection::vec(0i64..60, 1..80),
    ) {
        let mut now = 0;
        let events: Vec<(i64, Pad)> = gaps
            .into_iter()
            .map(|(gap, pad)| {
                now += gap;
                (now, pad)
            })
            .collect();
        let jumps = events.iter().filter(|(_, p)| *p == Pad::Jump).count();
        let mut scheduler = ReplayScheduler::new(record(0, &events), 0);

        let mut clock = 0;
        let mut next_index = 0;
        let mut applied_jumps = 0;
        for step in polls {
            clock += step;
            let out = scheduler.poll(clock);
            prop_assert_eq!(out.consumed.start, next_index);
            next_index = out.consumed.end;
            applied_jumps += out.actions.iter().filter(|a| **a == Pad::Jump).count();
            let holds = out
                .actions
                .iter()
                .filter(|a| a.policy() == ReplayPolicy::Hold)
                .count();
            prop_assert!(holds <= 1);
        }
        let tail = scheduler.poll(i64::MAX / 2);
        applied_jumps += tail.actions.iter().filter(|a| **a == Pad::Jump).count();

        prop_assert!(tail.finished);
        prop_assert_eq!(tail.consumed.end, events.len());
        prop_assert_eq!(applied_jumps, jumps);
    }
}
