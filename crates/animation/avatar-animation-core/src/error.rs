//! Error types surfaced by the engine and the clip pipeline.

use thiserror::Error;

/// Rejected control requests. The engine logs these and leaves its state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("unknown emotion '{0}'")]
    UnknownEmotion(String),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("unknown view mode '{0}'")]
    UnknownViewMode(String),
    #[error("invalid animation command: {0}")]
    InvalidCommand(String),
}

/// Structural problems in clip JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipError {
    #[error("clip json parse error: {0}")]
    Parse(String),
    #[error("track '{track}': {reason}")]
    InvalidTrack { track: String, reason: String },
}

impl From<serde_json::Error> for ClipError {
    fn from(e: serde_json::Error) -> Self {
        ClipError::Parse(e.to_string())
    }
}

/// Clip loading failures. `Clone` so a single failed load can be handed to
/// every caller awaiting the same path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("clip '{0}' not found")]
    NotFound(String),
    #[error("i/o error reading '{path}': {message}")]
    Io { path: String, message: String },
    #[error("clip '{path}' is malformed: {source}")]
    Malformed { path: String, source: ClipError },
    #[error("clip '{0}' contains no animation tracks")]
    Empty(String),
    #[error("no clip source configured")]
    NoSource,
}
