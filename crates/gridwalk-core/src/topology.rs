//! Movement topologies and neighbor enumeration on a [`Map`].

use crate::geom::Point;
use crate::map::Map;

/// The neighbor pattern governing which moves are valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Movement {
    /// Left and right only.
    Horizontal,
    /// Up and down only.
    Vertical,
    /// 4-connected.
    #[default]
    FourSides,
    /// 4-connected plus diagonals that do not cut a blocked corner.
    EightSides,
}

impl Movement {
    /// Every topology, in declaration order.
    pub const ALL: [Movement; 4] = [
        Movement::Horizontal,
        Movement::Vertical,
        Movement::FourSides,
        Movement::EightSides,
    ];

    /// Whether `to` is one step away from `from` under this topology.
    ///
    /// Purely geometric: colliders and corner cutting are not considered.
    pub fn is_step(self, from: Point, to: Point) -> bool {
        let d = to - from;
        let (ax, ay) = (d.x.abs(), d.y.abs());
        match self {
            Movement::Horizontal => ax == 1 && ay == 0,
            Movement::Vertical => ax == 0 && ay == 1,
            Movement::FourSides => ax + ay == 1,
            Movement::EightSides => ax.max(ay) == 1,
        }
    }

    #[inline]
    fn horizontal(self) -> bool {
        !matches!(self, Movement::Vertical)
    }

    #[inline]
    fn vertical(self) -> bool {
        !matches!(self, Movement::Horizontal)
    }
}

/// Reusable neighbor buffer.
///
/// Orthogonal neighbors are reported even when they are colliders; the
/// caller decides what to do with them. A diagonal neighbor is reported only
/// when both orthogonal cells flanking it are inside the map and not
/// colliders.
#[derive(Debug, Default)]
pub struct SidePoints {
    buf: Vec<Point>,
}

impl SidePoints {
    /// Create a new `SidePoints` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Collect the in-bounds neighbors of `center` under `movement`.
    ///
    /// Order: +x, -x, +y, -y, then the diagonals (+x+y), (-x+y), (+x-y),
    /// (-x-y). An absent or off-map center yields an empty slice.
    pub fn collect(&mut self, map: &Map, center: Option<Point>, movement: Movement) -> &[Point] {
        self.buf.clear();
        let Some(c) = center else {
            return &self.buf;
        };
        if !map.contains(c) {
            return &self.buf;
        }

        let right = c.shift(1, 0);
        let left = c.shift(-1, 0);
        let down = c.shift(0, 1);
        let up = c.shift(0, -1);

        if movement.horizontal() {
            self.push_in_bounds(map, right);
            self.push_in_bounds(map, left);
        }
        if movement.vertical() {
            self.push_in_bounds(map, down);
            self.push_in_bounds(map, up);
        }
        if movement == Movement::EightSides {
            for (dx, side_x, dy, side_y) in [
                (1, right, 1, down),
                (-1, left, 1, down),
                (1, right, -1, up),
                (-1, left, -1, up),
            ] {
                if map.is_walkable(side_x) && map.is_walkable(side_y) {
                    self.push_in_bounds(map, c.shift(dx, dy));
                }
            }
        }
        &self.buf
    }

    #[inline]
    fn push_in_bounds(&mut self, map: &Map, p: Point) {
        if map.contains(p) {
            self.buf.push(p);
        }
    }
}

impl Map {
    /// Neighbors of `center` under `movement`. See [`SidePoints::collect`].
    pub fn side_points(&self, center: Option<Point>, movement: Movement) -> Vec<Point> {
        let mut side = SidePoints::new();
        side.collect(self, center, movement).to_vec()
    }
}
