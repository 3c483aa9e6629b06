//! Error type for construction-time failures.
//!
//! Per-tick conditions (missing target, empty energy, stale block) are never
//! errors; they are handled in place by the systems that meet them.

use std::fmt;

/// Failures raised while loading data or building entities.
#[derive(Debug)]
pub enum Error {
    /// A block id with no catalog entry.
    UnknownBlockType(String),
    /// A ship blueprint id with no registered layout.
    UnknownBlueprint(String),
    /// A formation layout tag that names no prefab.
    UnknownFormationLayout(String),
    /// A formation given the wrong number of followers for its layout.
    FormationArity {
        layout: String,
        expected: usize,
        got: usize,
    },
    /// A blueprint whose contents break a structural rule.
    InvalidBlueprint { id: String, reason: String },
    /// Two blocks placed on the same slot.
    DuplicateCoordinate { x: i32, y: i32 },
    Json(serde_json::Error),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownBlockType(id) => write!(f, "unknown block type '{id}'"),
            Error::UnknownBlueprint(id) => write!(f, "unknown ship blueprint '{id}'"),
            Error::UnknownFormationLayout(tag) => write!(f, "unknown formation layout '{tag}'"),
            Error::FormationArity {
                layout,
                expected,
                got,
            } => write!(f, "formation '{layout}' takes {expected} followers, got {got}"),
            Error::InvalidBlueprint { id, reason } => {
                write!(f, "invalid blueprint '{id}': {reason}")
            }
            Error::DuplicateCoordinate { x, y } => {
                write!(f, "block slot ({x}, {y}) is already occupied")
            }
            Error::Json(e) => write!(f, "json: {e}"),
            Error::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
