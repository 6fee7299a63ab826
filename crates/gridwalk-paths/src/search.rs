use gridwalk_core::{Map, Movement, Point, Range, SidePoints};
use log::trace;
use rand::{Rng, RngExt};

use crate::distance::manhattan;

// ---------------------------------------------------------------------------
// Per-cell bookkeeping
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct Node {
    /// Accumulated cost from the origin.
    pub(crate) start: i32,
    /// Manhattan estimate to the destination.
    pub(crate) goal: i32,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) closed: bool,
}

impl Node {
    #[inline]
    pub(crate) fn rank(&self) -> i32 {
        self.start.saturating_add(self.goal)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            start: 0,
            goal: 0,
            parent: usize::MAX,
            generation: 0,
            closed: false,
        }
    }
}

/// Largest jitter bound honored by [`SearchSpace::search`]; larger values are
/// clamped.
pub const MAX_DEVIATION: u32 = 1 << 20;

/// One search between two cells of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    pub from: Point,
    pub to: Point,
    pub movement: Movement,
    /// Bound of the random jitter added to every step, in both directions.
    pub deviation: u32,
}

// ---------------------------------------------------------------------------
// SearchSpace
// ---------------------------------------------------------------------------

/// Scratch state for best-first searches over a [`Map`].
///
/// Bookkeeping is kept here, indexed by cell, and never on the map itself.
/// Each search bumps a generation counter so nodes left over from a
/// previous search are treated as unseen without clearing the array.
#[derive(Default)]
pub struct SearchSpace {
    pub(crate) bounds: Range,
    pub(crate) width: usize,
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    pub(crate) open: Vec<usize>,
    pub(crate) side: SidePoints,
}

impl SearchSpace {
    /// Create a new `SearchSpace` for the given grid rectangle.
    pub fn new(bounds: Range) -> Self {
        let mut space = Self::default();
        space.fit(bounds);
        space
    }

    /// Create a `SearchSpace` sized for `map`.
    pub fn for_map(map: &Map) -> Self {
        Self::new(map.bounds())
    }

    /// The grid rectangle being used.
    #[inline]
    pub fn range(&self) -> Range {
        self.bounds
    }

    /// Resize for a new grid rectangle.
    ///
    /// If the new size fits within the existing node array it is kept and
    /// only the generation is bumped; otherwise the array is reallocated.
    pub fn fit(&mut self, bounds: Range) {
        let len = bounds.len();
        self.bounds = bounds;
        self.width = bounds.width().max(0) as usize;
        if len <= self.nodes.len() {
            self.next_generation();
            return;
        }
        self.nodes.clear();
        self.nodes.resize(len, Node::default());
        self.generation = 0;
    }

    /// Find a path with the best-first search.
    ///
    /// The open list is scanned linearly for the lowest rank (ties go to the
    /// lower goal estimate, then to the earliest inserted). Each step costs
    /// `manhattan(current, next) + 1` plus a uniform jitter in
    /// `[-deviation, deviation]` drawn from `rng`; no draw happens when
    /// `deviation` is 0. The first time the destination is taken from the
    /// open list wins.
    ///
    /// `on_expand` is called with every cell as it is closed, together with
    /// its rank.
    ///
    /// Returns the steps from `from` (excluded) to `to` (included): empty
    /// when both are the same cell, `None` if `to` cannot be reached or
    /// either endpoint is outside the map.
    pub fn search(
        &mut self,
        map: &Map,
        request: SearchRequest,
        rng: &mut impl Rng,
        mut on_expand: impl FnMut(Point, i32),
    ) -> Option<Vec<Point>> {
        if self.bounds != map.bounds() {
            self.fit(map.bounds());
        }
        let SearchRequest {
            from,
            to,
            movement,
            deviation,
        } = request;
        let start_idx = self.idx(from)?;
        let goal_idx = self.idx(to)?;
        let deviation = deviation.min(MAX_DEVIATION) as i32;

        trace!("[Search] from={from} to={to} movement={movement:?} deviation={deviation}");

        let cur_gen = self.next_generation();
        {
            let node = &mut self.nodes[start_idx];
            node.start = 0;
            node.goal = manhattan(from, to);
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.closed = false;
        }
        self.open.clear();
        self.open.push(start_idx);

        let mut side = std::mem::take(&mut self.side);
        let mut expanded = 0usize;

        let found = loop {
            let Some(best) = self.best_open() else {
                break false;
            };
            let ci = self.open.remove(best);
            self.nodes[ci].closed = true;
            expanded += 1;

            let current_point = self.point(ci);
            on_expand(current_point, self.nodes[ci].rank());

            if ci == goal_idx {
                break true;
            }

            let current_start = self.nodes[ci].start;
            for &np in side.collect(map, Some(current_point), movement) {
                if map.is_collider(np) {
                    continue;
                }
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let seen = self.nodes[ni].generation == cur_gen;
                if seen && self.nodes[ni].closed {
                    continue;
                }

                let jitter = if deviation > 0 {
                    rng.random_range(-deviation..=deviation)
                } else {
                    0
                };
                let tentative =
                    current_start.saturating_add(manhattan(current_point, np) + 1 + jitter);

                let n = &mut self.nodes[ni];
                if seen && tentative >= n.start {
                    continue;
                }
                if !seen {
                    n.generation = cur_gen;
                    n.closed = false;
                    self.open.push(ni);
                }
                n.start = tentative;
                n.goal = manhattan(np, to);
                n.parent = ci;
            }
        };

        self.side = side;

        if !found {
            trace!("[Search] exhausted after {expanded} expansions");
            return None;
        }

        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != start_idx {
            path.push(self.point(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        trace!(
            "[Search] reached {to}: {} steps, {expanded} expansions",
            path.len()
        );
        Some(path)
    }

    /// Position in the open list of the lowest-ranked node.
    fn best_open(&self) -> Option<usize> {
        let mut best: Option<(usize, &Node)> = None;
        for (pos, &idx) in self.open.iter().enumerate() {
            let node = &self.nodes[idx];
            let better = match best {
                None => true,
                Some((_, b)) => {
                    node.rank() < b.rank() || (node.rank() == b.rank() && node.goal < b.goal)
                }
            };
            if better {
                best = Some((pos, node));
            }
        }
        best.map(|(pos, _)| pos)
    }

    /// Advance the generation, resetting all nodes when the counter wraps.
    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
        self.generation
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let x = (p.x - self.bounds.min.x) as usize;
        let y = (p.y - self.bounds.min.y) as usize;
        Some(y * self.width + x)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        let x = (idx % self.width) as i32 + self.bounds.min.x;
        let y = (idx / self.width) as i32 + self.bounds.min.y;
        Point::new(x, y)
    }
}
