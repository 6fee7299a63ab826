use gridwalk_core::{BoundsPolicy, Movement};

/// Search settings of a [`crate::Pathfinding`] agent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathConfig {
    /// Neighbor pattern used for every step.
    pub movement: Movement,
    /// Bound of the random per-step jitter; 0 gives cost-optimal paths.
    pub deviation: u32,
    /// What to do with start or target positions outside the map.
    pub out_of_bounds: BoundsPolicy,
    /// Seed for reproducible wandering. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            movement: Movement::FourSides,
            deviation: 0,
            out_of_bounds: BoundsPolicy::Clamp,
            seed: None,
        }
    }
}

/// Settings of a [`crate::PathWorker`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkerConfig {
    /// Name of the worker thread.
    pub name: String,
    /// Maximum number of queued jobs; `None` for an unbounded queue.
    /// Submitting to a full queue blocks until the worker catches up.
    pub capacity: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "gridwalk-worker".to_string(),
            capacity: None,
        }
    }
}
