//! Error types for Ghostline.

use thiserror::Error;

/// Top-level error type for Ghostline operations.
#[derive(Debug, Error)]
pub enum GhostError {
    /// Action log import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Session control errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while importing an action log.
///
/// Any of these rejects the whole payload; no partial log is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The text is not valid JSON
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// The payload is neither an event array nor an envelope holding one
    #[error("Expected a JSON array of action events")]
    NotAnArray,

    /// An element of the event array is not an object
    #[error("Event {index} is not an object")]
    NotAnObject {
        /// Position of the event in the array
        index: usize,
    },

    /// A required field is absent
    #[error("Event {index} is missing field `{field}`")]
    MissingField {
        /// Position of the event in the array
        index: usize,
        /// Name of the missing field
        field: &'static str,
    },

    /// A field is present but has the wrong shape
    #[error("Event {index} has invalid `{field}`: {reason}")]
    InvalidField {
        /// Position of the event in the array
        index: usize,
        /// Name of the offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// An envelope metadata key is present but has the wrong shape
    #[error("Log header has invalid `{field}`: {reason}")]
    InvalidHeader {
        /// Name of the offending key
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// The action tag is not part of the game's closed set
    #[error("Event {index} has unrecognized action `{tag}` for {game}")]
    UnknownAction {
        /// Position of the event in the array
        index: usize,
        /// The tag that was found
        tag: String,
        /// Game whose action set was checked
        game: &'static str,
    },

    /// Timestamps go backwards
    #[error("Event {index} timestamp {timestamp} precedes previous timestamp {previous}")]
    OutOfOrder {
        /// Position of the event in the array
        index: usize,
        /// Timestamp of the preceding event
        previous: i64,
        /// Timestamp of this event
        timestamp: i64,
    },

    /// The log was recorded for a different game
    #[error("Log was recorded for `{found}`, expected `{expected}`")]
    GameMismatch {
        /// Game the importer targets
        expected: &'static str,
        /// Game named in the log
        found: String,
    },

    /// The log format version cannot be read
    #[error("Unsupported log format version: {0}")]
    UnsupportedVersion(String),
}

/// Errors raised by session control operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A recording or replay is already running
    #[error("Cannot start a new session while {state}")]
    AlreadyActive {
        /// Name of the active state
        state: &'static str,
    },

    /// The requested replay seed differs from the seed stored in the log
    #[error("Replay seed {requested} does not match recorded seed {recorded}")]
    SeedMismatch {
        /// Seed stored in the log
        recorded: u64,
        /// Seed passed by the caller
        requested: u64,
    },
}

/// Result type alias for Ghostline operations.
pub type GhostResult<T> = Result<T, GhostError>;
