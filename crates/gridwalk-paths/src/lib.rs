//! Best-first pathfinding on [`gridwalk_core::Map`] grids.
//!
//! - **Search** ([`SearchSpace::search`]): an A*-style best-first search
//!   with a Manhattan estimate, an optional random per-step jitter
//!   ("deviation") for natural-looking wandering, and the four movement
//!   topologies of [`gridwalk_core::Movement`].
//! - **Agents** ([`Pathfinding`]): a start position plus one target or an
//!   ordered list of waypoints chained into one continuous path.
//! - **Background searches** ([`PathWorker`]): a single worker thread
//!   draining a FIFO queue of agents.
//!
//! Search bookkeeping lives in a [`SearchSpace`] arena, never on the map, so
//! one map can be shared by many agents and the worker at the same time.

mod config;
mod distance;
mod error;
mod pathfinding;
mod search;
mod worker;

pub use config::{PathConfig, WorkerConfig};
pub use distance::{chebyshev, manhattan};
pub use error::PathError;
pub use pathfinding::{Pathfinding, SearchFlag, Targets};
pub use search::{MAX_DEVIATION, SearchRequest, SearchSpace};
pub use worker::{Completed, JobHandle, PathWorker};
