//! A fixed-size grid of [`Cell`] values addressed by [`Point`].
//!
//! A [`Map`] is built once and is read-only while searches run on it, so it
//! can be shared between agents and worker threads behind an `Arc`.

use std::fmt;

use crate::geom::{Point, Range, Vec2};

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Grid coordinate of the cell.
    pub pos: Point,
    /// World position of the cell's center.
    pub world: Vec2,
    /// Impassable when `true`.
    pub collider: bool,
}

/// What [`Map::point_at`] does with a world position outside the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundsPolicy {
    /// Collapse the position onto the nearest border cell.
    ///
    /// Distinct off-grid positions alias to the same cell.
    #[default]
    Clamp,
    /// Fail with [`MapError::OutOfBounds`].
    Reject,
}

/// A rectangular grid of cells with a world-space origin and cell size.
///
/// With the `serde` feature a map is stored as its size, origin, cell size
/// and collider list, and rebuilt through [`Map::new`] when loaded.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "MapRepr", into = "MapRepr")
)]
pub struct Map {
    cells: Vec<Cell>,
    bounds: Range,
    origin: Vec2,
    cell_size: f32,
}

impl Map {
    /// Create a collider-free map of `width` × `height` cells.
    ///
    /// `origin` is the world position of cell (0, 0) and `cell_size` the
    /// world distance between adjacent cell centers.
    pub fn new(width: i32, height: i32, origin: Vec2, cell_size: f32) -> Result<Self, MapError> {
        if width <= 0 || height <= 0 {
            return Err(MapError::EmptyGrid { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(MapError::InvalidCellSize(cell_size));
        }
        if !origin.is_finite() {
            return Err(MapError::InvalidOrigin(origin));
        }
        let bounds = Range::new(0, 0, width, height);
        let cells = bounds
            .iter()
            .map(|pos| Cell {
                pos,
                world: origin + Vec2::from(pos) * cell_size,
                collider: false,
            })
            .collect();
        Ok(Self {
            cells,
            bounds,
            origin,
            cell_size,
        })
    }

    /// Create a collider-free map with origin (0, 0) and unit cells, so that
    /// world positions and grid coordinates coincide.
    pub fn open(width: i32, height: i32) -> Result<Self, MapError> {
        Self::new(width, height, Vec2::ZERO, 1.0)
    }

    /// The grid rectangle, always anchored at (0, 0).
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Returns the size as a Point (width = x, height = y).
    #[inline]
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    /// Width of the map.
    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// Height of the map.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// World position of cell (0, 0).
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World distance between adjacent cells.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Whether the map contains the given point.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// Flat row-major index of `p`, or `None` if out of bounds.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some(p.y as usize * self.bounds.width() as usize + p.x as usize)
    }

    /// Get the cell at a point, or `None` if out of bounds.
    pub fn cell(&self, p: Point) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Whether `p` is an in-bounds collider cell.
    pub fn is_collider(&self, p: Point) -> bool {
        self.cell(p).is_some_and(|c| c.collider)
    }

    /// Whether `p` is an in-bounds cell that can be walked on.
    pub fn is_walkable(&self, p: Point) -> bool {
        self.cell(p).is_some_and(|c| !c.collider)
    }

    /// Mark or unmark a cell as a collider. Returns `false` if `p` is out of
    /// bounds.
    pub fn set_collider(&mut self, p: Point, collider: bool) -> bool {
        match self.index(p) {
            Some(i) => {
                self.cells[i].collider = collider;
                true
            }
            None => false,
        }
    }

    /// World position of the center of cell `p`. Points outside the grid are
    /// extrapolated.
    pub fn world_of(&self, p: Point) -> Vec2 {
        self.origin + Vec2::from(p) * self.cell_size
    }

    /// Grid cell covering a world position.
    ///
    /// The offset from the origin is divided by the cell size and rounded to
    /// the nearest cell. Positions outside the grid are handled according to
    /// `policy`. Non-finite positions have no cell and always fail.
    pub fn point_at(&self, world: Vec2, policy: BoundsPolicy) -> Result<Point, MapError> {
        if !world.is_finite() {
            return Err(MapError::NonFinite(world));
        }
        let cell = ((world - self.origin) * (1.0 / self.cell_size)).round();
        if self.bounds.contains(cell) {
            return Ok(cell);
        }
        match policy {
            BoundsPolicy::Clamp => Ok(self.bounds.clamp(cell)),
            BoundsPolicy::Reject => Err(MapError::OutOfBounds { world, cell }),
        }
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Number of collider cells.
    pub fn collider_count(&self) -> usize {
        self.cells.iter().filter(|c| c.collider).count()
    }

    /// Smallest range covering every walkable cell, or an empty range when
    /// the whole map is blocked.
    pub fn extent(&self) -> Range {
        let mut walkable = self.cells.iter().filter(|c| !c.collider).map(|c| c.pos);
        let Some(first) = walkable.next() else {
            return Range::default();
        };
        let (min, max) = walkable.fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        });
        Range::new(min.x, min.y, max.x + 1, max.y + 1)
    }
}

/// Errors raised while building or querying a [`Map`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// Width or height is not positive.
    EmptyGrid { width: i32, height: i32 },
    /// Cell size is not a positive finite number.
    InvalidCellSize(f32),
    /// Origin is not finite.
    InvalidOrigin(Vec2),
    /// A collider lies outside the grid.
    ColliderOutOfBounds(Point),
    /// A world position with a NaN or infinite coordinate.
    NonFinite(Vec2),
    /// A world position fell outside the grid under [`BoundsPolicy::Reject`].
    OutOfBounds { world: Vec2, cell: Point },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "map: grid must have positive size, got {width}x{height}")
            }
            Self::InvalidCellSize(size) => write!(f, "map: invalid cell size {size}"),
            Self::InvalidOrigin(origin) => write!(f, "map: invalid origin {origin}"),
            Self::ColliderOutOfBounds(p) => write!(f, "map: collider {p} outside the grid"),
            Self::NonFinite(world) => write!(f, "map: world position {world} is not finite"),
            Self::OutOfBounds { world, cell } => {
                write!(f, "map: world position {world} maps to cell {cell} outside the grid")
            }
        }
    }
}

impl std::error::Error for MapError {}

// ---------------------------------------------------------------------------
// Stored form
// ---------------------------------------------------------------------------

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct MapRepr {
    width: i32,
    height: i32,
    origin: Vec2,
    cell_size: f32,
    #[serde(default)]
    colliders: Vec<Point>,
}

#[cfg(feature = "serde")]
impl From<Map> for MapRepr {
    fn from(map: Map) -> Self {
        let colliders = map.cells.iter().filter(|c| c.collider).map(|c| c.pos).collect();
        Self {
            width: map.width(),
            height: map.height(),
            origin: map.origin,
            cell_size: map.cell_size,
            colliders,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<MapRepr> for Map {
    type Error = MapError;

    fn try_from(repr: MapRepr) -> Result<Self, MapError> {
        let mut map = Map::new(repr.width, repr.height, repr.origin, repr.cell_size)?;
        for p in repr.colliders {
            if !map.set_collider(p, true) {
                return Err(MapError::ColliderOutOfBounds(p));
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_size() {
        let m = Map::open(10, 5).unwrap();
        assert_eq!(m.size(), Point::new(10, 5));
        assert_eq!(m.width(), 10);
        assert_eq!(m.height(), 5);
        assert_eq!(m.cells().len(), 50);
        assert_eq!(m.collider_count(), 0);
    }

    #[test]
    fn rejects_degenerate_maps() {
        assert_eq!(
            Map::open(0, 4).unwrap_err(),
            MapError::EmptyGrid { width: 0, height: 4 }
        );
        assert!(Map::new(3, 3, Vec2::ZERO, 0.0).is_err());
        assert!(Map::new(3, 3, Vec2::ZERO, f32::INFINITY).is_err());
        let origin = Vec2::new(f32::NAN, 0.0);
        let err = Map::new(3, 3, origin, 1.0).unwrap_err();
        assert!(matches!(err, MapError::InvalidOrigin(o) if o.x.is_nan()));
        assert!(err.to_string().contains("origin"));
    }

    #[test]
    fn cells_are_row_major_with_world_positions() {
        let m = Map::new(3, 2, Vec2::new(10.0, 20.0), 0.5).unwrap();
        assert_eq!(m.index(Point::new(2, 1)), Some(5));
        assert_eq!(m.index(Point::new(3, 0)), None);
        let c = m.cell(Point::new(2, 1)).unwrap();
        assert_eq!(c.pos, Point::new(2, 1));
        assert_eq!(c.world, Vec2::new(11.0, 20.5));
        assert_eq!(m.world_of(Point::new(2, 1)), c.world);
    }

    #[test]
    fn set_and_query_colliders() {
        let mut m = Map::open(4, 4).unwrap();
        assert!(m.set_collider(Point::new(1, 2), true));
        assert!(!m.set_collider(Point::new(4, 0), true));
        assert!(m.is_collider(Point::new(1, 2)));
        assert!(!m.is_walkable(Point::new(1, 2)));
        assert!(m.is_walkable(Point::new(0, 0)));
        assert!(!m.is_walkable(Point::new(-1, 0)));
        assert!(!m.is_collider(Point::new(-1, 0)));
        assert_eq!(m.collider_count(), 1);
    }

    #[test]
    fn point_at_rounds_relative_to_origin() {
        let m = Map::new(5, 5, Vec2::new(-2.0, 3.0), 1.0).unwrap();
        let p = m.point_at(Vec2::new(-0.6, 4.4), BoundsPolicy::Reject).unwrap();
        assert_eq!(p, Point::new(1, 1));

        let half = Map::new(4, 4, Vec2::ZERO, 0.5).unwrap();
        let p = half.point_at(Vec2::new(1.1, 0.4), BoundsPolicy::Reject).unwrap();
        assert_eq!(p, Point::new(2, 1));
    }

    #[test]
    fn point_at_clamps_and_aliases_off_grid_positions() {
        let m = Map::open(5, 5).unwrap();
        let a = m.point_at(Vec2::new(9.0, 2.0), BoundsPolicy::Clamp).unwrap();
        let b = m.point_at(Vec2::new(40.0, 2.0), BoundsPolicy::Clamp).unwrap();
        assert_eq!(a, Point::new(4, 2));
        assert_eq!(a, b);
        let c = m.point_at(Vec2::new(-3.0, -7.0), BoundsPolicy::Clamp).unwrap();
        assert_eq!(c, Point::new(0, 0));
    }

    #[test]
    fn point_at_rejects_off_grid_positions() {
        let m = Map::open(5, 5).unwrap();
        let err = m
            .point_at(Vec2::new(5.0, 1.0), BoundsPolicy::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            MapError::OutOfBounds {
                world: Vec2::new(5.0, 1.0),
                cell: Point::new(5, 1),
            }
        );
        assert!(err.to_string().contains("outside the grid"));
    }

    #[test]
    fn point_at_fails_on_non_finite_positions() {
        let m = Map::open(5, 5).unwrap();
        for policy in [BoundsPolicy::Clamp, BoundsPolicy::Reject] {
            let err = m.point_at(Vec2::new(f32::NAN, 0.0), policy).unwrap_err();
            assert!(matches!(err, MapError::NonFinite(_)));
            let err = m
                .point_at(Vec2::new(2.0, f32::INFINITY), policy)
                .unwrap_err();
            assert!(matches!(err, MapError::NonFinite(_)));
        }
    }

    #[test]
    fn extent_tracks_walkable_cells() {
        let mut m = Map::open(4, 3).unwrap();
        assert_eq!(m.extent(), m.bounds());
        for p in m.bounds() {
            m.set_collider(p, true);
        }
        assert!(m.extent().is_empty());
        m.set_collider(Point::new(1, 0), false);
        m.set_collider(Point::new(2, 2), false);
        assert_eq!(m.extent(), Range::new(1, 0, 3, 3));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn map_round_trip() {
        let mut m = Map::new(3, 2, Vec2::new(1.0, 1.0), 2.0).unwrap();
        m.set_collider(Point::new(1, 1), true);
        let json = serde_json::to_string(&m).unwrap();
        let back: Map = serde_json::from_str(&json).unwrap();
        assert_eq!(back.size(), m.size());
        assert!(back.is_collider(Point::new(1, 1)));
        assert_eq!(back.world_of(Point::new(2, 0)), Vec2::new(5.0, 1.0));
        assert_eq!(back.collider_count(), 1);
        assert_eq!(back.cells().len(), 6);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let load = |json: &str| serde_json::from_str::<Map>(json);
        let origin = r#""origin":{"x":0.0,"y":0.0}"#;

        assert!(load(&format!(r#"{{"width":0,"height":3,{origin},"cell_size":1.0}}"#)).is_err());
        assert!(load(&format!(r#"{{"width":3,"height":3,{origin},"cell_size":-1.0}}"#)).is_err());
        let err = load(&format!(
            r#"{{"width":3,"height":3,{origin},"cell_size":1.0,"colliders":[{{"x":3,"y":0}}]}}"#
        ))
        .unwrap_err();
        assert!(err.to_string().contains("outside the grid"), "{err}");

        let m = load(&format!(r#"{{"width":3,"height":3,{origin},"cell_size":1.0}}"#)).unwrap();
        assert!(!m.is_collider(Point::new(1, 1)));
        assert_eq!(m.cells().len(), 9);
    }
}
