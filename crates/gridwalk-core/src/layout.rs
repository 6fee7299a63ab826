//! ASCII layouts for building maps and rendering paths.
//!
//! A layout is a rectangular picture where `#` is a collider, `.` is floor,
//! and any ASCII letter or digit is a floor cell carrying a named marker:
//!
//! ```text
//! S..#....
//! ...#..1.
//! .......2
//! ```

use std::fmt;

use crate::geom::{Point, Vec2};
use crate::map::{Map, MapError};

const COLLIDER: char = '#';
const FLOOR: char = '.';
const PATH: char = '*';

/// A parsed ASCII layout.
#[derive(Debug, Clone)]
pub struct Layout {
    colliders: Vec<Point>,
    markers: Vec<(char, Point)>,
    size: Point,
}

impl Layout {
    /// Parse a layout. Leading and trailing blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        let Some(first) = lines.iter().position(|l| !l.is_empty()) else {
            return Err(LayoutError::Empty);
        };
        let last = lines.iter().rposition(|l| !l.is_empty()).unwrap_or(first);
        let lines = &lines[first..=last];
        let width = lines[0].chars().count();
        let mut colliders = Vec::new();
        let mut markers = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(LayoutError::InconsistentSize {
                    line: y,
                    expected: width,
                    found: line.chars().count(),
                });
            }
            for (x, ch) in line.chars().enumerate() {
                let pos = Point::new(x as i32, y as i32);
                match ch {
                    COLLIDER => colliders.push(pos),
                    FLOOR => {}
                    c if c.is_ascii_alphanumeric() => markers.push((c, pos)),
                    c => return Err(LayoutError::InvalidRune { ch: c, pos }),
                }
            }
        }

        Ok(Self {
            colliders,
            markers,
            size: Point::new(width as i32, lines.len() as i32),
        })
    }

    /// Size of the layout (width = x, height = y).
    pub fn size(&self) -> Point {
        self.size
    }

    /// Position of the first occurrence of marker `ch`.
    pub fn marker(&self, ch: char) -> Option<Point> {
        self.markers.iter().find(|(c, _)| *c == ch).map(|&(_, p)| p)
    }

    /// All markers in reading order.
    pub fn markers(&self) -> &[(char, Point)] {
        &self.markers
    }

    /// Build a map with the given world origin and cell size.
    pub fn to_map(&self, origin: Vec2, cell_size: f32) -> Result<Map, MapError> {
        let mut map = Map::new(self.size.x, self.size.y, origin, cell_size)?;
        for &p in &self.colliders {
            map.set_collider(p, true);
        }
        Ok(map)
    }

    /// Build a map whose world positions equal its grid coordinates.
    pub fn build(&self) -> Result<Map, MapError> {
        self.to_map(Vec2::ZERO, 1.0)
    }
}

/// Draw `map` as text, marking every cell of `path` with `*`.
pub fn render(map: &Map, path: &[Point]) -> String {
    let mut out = String::with_capacity(map.bounds().len() + map.height() as usize);
    for y in 0..map.height() {
        for x in 0..map.width() {
            let p = Point::new(x, y);
            let ch = if path.contains(&p) {
                PATH
            } else if map.is_collider(p) {
                COLLIDER
            } else {
                FLOOR
            };
            out.push(ch);
        }
        if y < map.height() - 1 {
            out.push('\n');
        }
    }
    out
}

/// Errors that can occur when parsing a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The text contains no cells.
    Empty,
    /// A line's width differs from the first line.
    InconsistentSize {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A character outside the layout alphabet was found.
    InvalidRune { ch: char, pos: Point },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("layout: empty"),
            Self::InconsistentSize {
                line,
                expected,
                found,
            } => write!(
                f,
                "layout: line {line} has width {found}, expected {expected}"
            ),
            Self::InvalidRune { ch, pos } => {
                write!(f, "layout contains invalid rune \u{201c}{ch}\u{201d} at {pos}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "
S..#
.#.1
....";

    #[test]
    fn parse_and_size() {
        let l = Layout::parse(ROOM).unwrap();
        assert_eq!(l.size(), Point::new(4, 3));
        assert_eq!(l.marker('S'), Some(Point::new(0, 0)));
        assert_eq!(l.marker('1'), Some(Point::new(3, 1)));
        assert_eq!(l.marker('X'), None);
        assert_eq!(l.markers().len(), 2);
    }

    #[test]
    fn build_marks_colliders() {
        let m = Layout::parse(ROOM).unwrap().build().unwrap();
        assert_eq!(m.size(), Point::new(4, 3));
        assert_eq!(m.collider_count(), 2);
        assert!(m.is_collider(Point::new(3, 0)));
        assert!(m.is_collider(Point::new(1, 1)));
        assert!(m.is_walkable(Point::new(3, 1)));
    }

    #[test]
    fn to_map_uses_origin_and_cell_size() {
        let m = Layout::parse(ROOM)
            .unwrap()
            .to_map(Vec2::new(5.0, 5.0), 2.0)
            .unwrap();
        assert_eq!(m.world_of(Point::new(1, 2)), Vec2::new(7.0, 9.0));
    }

    #[test]
    fn render_draws_path() {
        let m = Layout::parse(ROOM).unwrap().build().unwrap();
        let path = [Point::new(0, 1), Point::new(0, 2), Point::new(1, 2)];
        assert_eq!(render(&m, &path), "...#\n*#..\n**..");
    }

    #[test]
    fn inconsistent_size_error() {
        let err = Layout::parse("..\n...").unwrap_err();
        assert_eq!(
            err,
            LayoutError::InconsistentSize {
                line: 1,
                expected: 2,
                found: 3,
            }
        );
    }

    #[test]
    fn invalid_rune_error() {
        let err = Layout::parse("..\n.~").unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidRune {
                ch: '~',
                pos: Point::new(1, 1),
            }
        );
        assert!(err.to_string().contains("(1, 1)"));
    }

    #[test]
    fn empty_layout_error() {
        assert_eq!(Layout::parse("\n\n").unwrap_err(), LayoutError::Empty);
        assert_eq!(Layout::parse(" \n\t\n").unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn whitespace_only_edge_lines_are_skipped() {
        let layout = Layout::parse("\n   \n.#\nS.\n  \n").unwrap();
        assert_eq!(layout.size(), Point::new(2, 2));
        assert_eq!(layout.marker('S'), Some(Point::new(0, 1)));
    }
}
