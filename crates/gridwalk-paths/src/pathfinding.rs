//! The [`Pathfinding`] agent: one mobile agent's search configuration and
//! its most recent path.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gridwalk_core::{Map, Point, Vec2};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, RngExt, SeedableRng};

use crate::config::PathConfig;
use crate::error::PathError;
use crate::search::{SearchRequest, SearchSpace};

/// Where an agent is heading.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Targets {
    /// Nothing to search for yet.
    #[default]
    None,
    /// One destination, kept after each search.
    Single(Vec2),
    /// Waypoints visited in order; each is consumed once reached.
    Multiple(VecDeque<Vec2>),
}

/// Shared "currently searching" flag of an agent.
#[derive(Debug, Clone, Default)]
pub struct SearchFlag(Arc<AtomicBool>);

impl SearchFlag {
    /// Whether a search is queued or running.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set(&self, searching: bool) {
        self.0.store(searching, Ordering::Release);
    }
}

/// Path planning state of one agent on a shared [`Map`].
#[derive(Debug)]
pub struct Pathfinding {
    map: Arc<Map>,
    config: PathConfig,
    start: Vec2,
    targets: Targets,
    path: Vec<Point>,
    searching: SearchFlag,
    rng: StdRng,
}

impl Pathfinding {
    /// Create an agent starting at the world origin with no target.
    pub fn new(map: Arc<Map>, config: PathConfig) -> Self {
        let rng = seeded(config.seed);
        Self {
            map,
            config,
            start: Vec2::ZERO,
            targets: Targets::None,
            path: Vec::new(),
            searching: SearchFlag::default(),
            rng,
        }
    }

    /// Set the starting position.
    pub fn with_start(mut self, start: Vec2) -> Self {
        self.start = start;
        self
    }

    /// Set a single target.
    pub fn with_target(mut self, target: Vec2) -> Self {
        self.set_target(target);
        self
    }

    /// Set an ordered list of targets.
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Vec2>) -> Self {
        self.set_targets(targets);
        self
    }

    pub fn map(&self) -> &Arc<Map> {
        &self.map
    }

    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Replace the configuration. A configured seed restarts the RNG.
    pub fn set_config(&mut self, config: PathConfig) {
        if config.seed.is_some() {
            self.rng = seeded(config.seed);
        }
        self.config = config;
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn set_start(&mut self, start: Vec2) {
        self.start = start;
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    /// Switch to single-target mode.
    pub fn set_target(&mut self, target: Vec2) {
        self.targets = Targets::Single(target);
    }

    /// Switch to multiple-target mode with the given waypoints.
    pub fn set_targets(&mut self, targets: impl IntoIterator<Item = Vec2>) {
        self.targets = Targets::Multiple(targets.into_iter().collect());
    }

    /// Append a waypoint, switching to multiple-target mode. A single target
    /// already set becomes the first waypoint.
    pub fn push_target(&mut self, target: Vec2) {
        let queue = match std::mem::take(&mut self.targets) {
            Targets::Multiple(mut queue) => {
                queue.push_back(target);
                queue
            }
            Targets::Single(first) => VecDeque::from([first, target]),
            Targets::None => VecDeque::from([target]),
        };
        self.targets = Targets::Multiple(queue);
    }

    pub fn clear_targets(&mut self) {
        self.targets = Targets::None;
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self.targets, Targets::Multiple(_))
    }

    /// Cells of the last path, origin excluded.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Take the last path, leaving an empty one behind.
    pub fn take_path(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.path)
    }

    /// World positions of the last path's cells.
    pub fn path_world(&self) -> Vec<Vec2> {
        self.path.iter().map(|&p| self.map.world_of(p)).collect()
    }

    /// Whether a search is queued or running for this agent.
    pub fn is_searching(&self) -> bool {
        self.searching.is_set()
    }

    /// A handle to the searching flag that can be polled from elsewhere.
    pub fn search_flag(&self) -> SearchFlag {
        self.searching.clone()
    }

    /// Search synchronously with fresh scratch space.
    pub fn find_path(&mut self) -> Result<&[Point], PathError> {
        let mut space = SearchSpace::for_map(&self.map);
        self.find_path_in(&mut space)
    }

    /// Search synchronously, reusing `space`.
    ///
    /// In single-target mode the path leads to the target. In
    /// multiple-target mode the path visits every waypoint in order, each
    /// leg starting where the previous one ended, and reached waypoints are
    /// removed. When a leg fails the error is returned, the unreached
    /// waypoints stay queued and [`Self::path`] holds the completed legs.
    pub fn find_path_in(&mut self, space: &mut SearchSpace) -> Result<&[Point], PathError> {
        self.searching.set(true);
        let outcome = self.search_all(space);
        self.searching.set(false);
        outcome?;
        Ok(&self.path)
    }

    /// Runs the search without touching the searching flag.
    pub(crate) fn search_all(&mut self, space: &mut SearchSpace) -> Result<(), PathError> {
        self.path.clear();
        let policy = self.config.out_of_bounds;
        let single = match &self.targets {
            Targets::None => return Err(PathError::InvalidConfiguration("no target set")),
            Targets::Single(target) => Some(*target),
            Targets::Multiple(queue) if queue.is_empty() => {
                return Err(PathError::InvalidConfiguration(
                    "multiple-target mode without targets",
                ));
            }
            Targets::Multiple(_) => None,
        };

        let mut origin = self.map.point_at(self.start, policy)?;
        if let Some(target) = single {
            let dest = self.map.point_at(target, policy)?;
            self.path = self.leg(space, origin, dest)?;
            return Ok(());
        }

        while let Some(target) = self.next_waypoint() {
            let dest = self.map.point_at(target, policy)?;
            let steps = self.leg(space, origin, dest)?;
            self.path.extend(steps);
            if let Targets::Multiple(queue) = &mut self.targets {
                queue.pop_front();
            }
            origin = dest;
        }
        Ok(())
    }

    fn next_waypoint(&self) -> Option<Vec2> {
        match &self.targets {
            Targets::Multiple(queue) => queue.front().copied(),
            _ => None,
        }
    }

    fn leg(
        &mut self,
        space: &mut SearchSpace,
        from: Point,
        to: Point,
    ) -> Result<Vec<Point>, PathError> {
        let request = SearchRequest {
            from,
            to,
            movement: self.config.movement,
            deviation: self.config.deviation,
        };
        space
            .search(&self.map, request, &mut self.rng, |_, _| {})
            .ok_or_else(|| {
                debug!("[Pathfinding] {to} unreachable from {from}");
                PathError::Unreachable { from, to }
            })
    }

    /// A random world position at most `distance` away from the start on
    /// each axis.
    pub fn random_position(&mut self, distance: f32) -> Vec2 {
        self.random_position_xy(distance, distance)
    }

    /// A random world position at most `dx` away from the start on the X
    /// axis and `dy` on the Y axis.
    pub fn random_position_xy(&mut self, dx: f32, dy: f32) -> Vec2 {
        let x = spread(&mut self.rng, dx);
        let y = spread(&mut self.rng, dy);
        self.start + Vec2::new(x, y)
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

fn spread(rng: &mut impl Rng, distance: f32) -> f32 {
    let d = if distance.is_finite() { distance.abs() } else { 0.0 };
    if d == 0.0 {
        return 0.0;
    }
    d * rng.random_range(-1.0f32..=1.0)
}
