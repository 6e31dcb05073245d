//! JSON interchange for action logs.
//!
//! Two shapes are written and read:
//! - the bare event array, `[{"timestamp", "action", "gameState"}, ...]`;
//! - the envelope, which wraps the same array with the format version, game
//!   name, recording seed and recording start time.
//!
//! Import is strict. The first structural problem rejects the whole payload
//! with an [`ImportError`]; nothing is partially imported.

use crate::action::{ActionTag, GameKind};
use crate::event::{check_order, ActionEvent, ActionLog};
use ghost_common::{GhostError, ImportError, SchemaVersion};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Serialize)]
#[serde(bound = "", rename_all = "camelCase")]
struct Envelope<'a, G: GameKind> {
    version: String,
    game: &'static str,
    seed: Option<u64>,
    started_at: Option<i64>,
    events: &'a [ActionEvent<G>],
}

/// Serializes a log as an envelope carrying its seed and start time.
///
/// # Errors
///
/// Returns [`GhostError::Serialization`] if JSON encoding fails.
pub fn serialize<G: GameKind>(log: &ActionLog<G>) -> Result<String, GhostError> {
    let envelope = Envelope {
        version: SchemaVersion::ACTION_LOG.to_string(),
        game: G::NAME,
        seed: log.seed(),
        started_at: log.started_at(),
        events: log.events(),
    };
    serde_json::to_string(&envelope).map_err(|e| GhostError::Serialization(e.to_string()))
}

/// Serializes only the event array.
///
/// # Errors
///
/// Returns [`GhostError::Serialization`] if JSON encoding fails.
pub fn serialize_events<G: GameKind>(log: &ActionLog<G>) -> Result<String, GhostError> {
    serde_json::to_string(log.events()).map_err(|e| GhostError::Serialization(e.to_string()))
}

/// Parses and validates a log for game `G`.
///
/// Accepts either the bare event array or the envelope.
///
/// # Errors
///
/// Returns an [`ImportError`] describing the first problem found.
pub fn deserialize<G: GameKind>(text: &str) -> Result<ActionLog<G>, ImportError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ImportError::MalformedJson(e.to_string()))?;

    let result = match value {
        Value::Array(items) => parse_events::<G>(&items).and_then(ActionLog::from_events),
        Value::Object(map) => parse_envelope::<G>(&map),
        _ => Err(ImportError::NotAnArray),
    };

    match &result {
        Ok(log) if log.is_empty() => debug!(game = G::NAME, "Imported empty action log"),
        Ok(log) => debug!(game = G::NAME, events = log.len(), "Imported action log"),
        Err(e) => debug!(game = G::NAME, error = %e, "Rejected action log"),
    }
    result
}

fn parse_envelope<G: GameKind>(map: &Map<String, Value>) -> Result<ActionLog<G>, ImportError> {
    let Some(Value::Array(items)) = map.get("events") else {
        return Err(ImportError::NotAnArray);
    };

    if let Some(game) = map.get("game") {
        let found = game.as_str().unwrap_or_default();
        if found != G::NAME {
            return Err(ImportError::GameMismatch {
                expected: G::NAME,
                found: found.to_string(),
            });
        }
    }

    if let Some(version) = map.get("version").and_then(Value::as_str) {
        let parsed: SchemaVersion = version
            .parse()
            .map_err(|_| ImportError::UnsupportedVersion(version.to_string()))?;
        if !SchemaVersion::ACTION_LOG.can_read(&parsed) {
            return Err(ImportError::UnsupportedVersion(version.to_string()));
        }
    }

    let seed = header_field(map, "seed", Value::as_u64, "a non-negative integer")?;
    let started_at = header_field(map, "startedAt", Value::as_i64, "an integer")?;

    let log = ActionLog::from_events(parse_events::<G>(items)?)?;
    if let (Some(start), Some(first)) = (started_at, log.events().first()) {
        if first.timestamp < start {
            return Err(ImportError::OutOfOrder {
                index: 0,
                previous: start,
                timestamp: first.timestamp,
            });
        }
    }
    Ok(log.with_seed(seed).with_started_at(started_at))
}

/// Reads an optional envelope key. Absent and `null` mean unknown; anything
/// else must have the expected shape.
fn header_field<T>(
    map: &Map<String, Value>,
    field: &'static str,
    read: impl Fn(&Value) -> Option<T>,
    expected: &str,
) -> Result<Option<T>, ImportError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => read(raw).map(Some).ok_or_else(|| ImportError::InvalidHeader {
            field,
            reason: format!("expected {expected}, found {raw}"),
        }),
    }
}

fn parse_events<G: GameKind>(items: &[Value]) -> Result<Vec<ActionEvent<G>>, ImportError> {
    let events = items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_event::<G>(index, item))
        .collect::<Result<Vec<_>, _>>()?;
    check_order(&events)?;
    Ok(events)
}

fn parse_event<G: GameKind>(index: usize, item: &Value) -> Result<ActionEvent<G>, ImportError> {
    let obj = item.as_object().ok_or(ImportError::NotAnObject { index })?;

    let raw_timestamp = obj.get("timestamp").ok_or(ImportError::MissingField {
        index,
        field: "timestamp",
    })?;
    let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| ImportError::InvalidField {
        index,
        field: "timestamp",
        reason: format!("expected a number, found {raw_timestamp}"),
    })?;

    let raw_action = obj.get("action").ok_or(ImportError::MissingField {
        index,
        field: "action",
    })?;
    let tag = raw_action.as_str().ok_or_else(|| ImportError::InvalidField {
        index,
        field: "action",
        reason: format!("expected a string, found {raw_action}"),
    })?;
    let action = G::Action::from_tag(tag).ok_or_else(|| ImportError::UnknownAction {
        index,
        tag: tag.to_string(),
        game: G::NAME,
    })?;

    let game_state = match obj.get("gameState") {
        None | Some(Value::Null) => G::Snapshot::default(),
        Some(raw) => {
            serde_json::from_value(raw.clone()).map_err(|e| ImportError::InvalidField {
                index,
                field: "gameState",
                reason: e.to_string(),
            })?
        },
    };

    Ok(ActionEvent::new(timestamp, action, game_state))
}

fn parse_timestamp(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
}
