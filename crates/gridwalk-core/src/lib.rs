//! **gridwalk-core**: grid maps for pathfinding.
//!
//! This crate provides the data side of the *gridwalk* workspace: geometry
//! primitives, a fixed-size [`Map`] of collider cells with a world-space
//! origin, the four movement topologies and their neighbor enumeration, and
//! ASCII layouts for building maps in tools and tests.

pub mod geom;
pub mod layout;
pub mod map;
pub mod topology;

pub use geom::{Point, Range, Vec2};
pub use layout::{Layout, LayoutError, render};
pub use map::{BoundsPolicy, Cell, Map, MapError};
pub use topology::{Movement, SidePoints};
