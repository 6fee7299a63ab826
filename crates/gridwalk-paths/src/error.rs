use std::fmt;

use gridwalk_core::{MapError, Point};

/// Errors returned by path searches and the background worker.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// The start or a target could not be resolved to a grid cell.
    Map(MapError),
    /// The open set emptied before the destination was reached.
    Unreachable { from: Point, to: Point },
    /// The agent is not set up for a search (e.g. no targets).
    InvalidConfiguration(&'static str),
    /// The worker shut down before the job could be queued or answered.
    WorkerStopped,
    /// The worker thread could not be spawned.
    WorkerSpawn(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(e) => write!(f, "path: {e}"),
            Self::Unreachable { from, to } => write!(f, "path: {to} is unreachable from {from}"),
            Self::InvalidConfiguration(why) => write!(f, "path: invalid configuration: {why}"),
            Self::WorkerStopped => f.write_str("path: worker stopped"),
            Self::WorkerSpawn(e) => write!(f, "path: failed to spawn worker: {e}"),
        }
    }
}

impl std::error::Error for PathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Map(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MapError> for PathError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}
