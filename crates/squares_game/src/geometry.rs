//! Integer grid geometry shared by the shape engine and the board.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// Width and height of the square board.
pub const BOARD_SIZE: i32 = 21;

/// Board width in cells.
pub const BOARD_WIDTH: i32 = BOARD_SIZE;

/// Board height in cells.
pub const BOARD_HEIGHT: i32 = BOARD_SIZE;

/// Longest side of any catalog piece's bounding box.
pub const MAX_SHAPE_EXTENT: i32 = 5;

/// A cell offset or an absolute cell address.
///
/// `x` grows to the right and `y` grows downward, so `(0, 0)` is the
/// top-left cell of the board.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
)]
#[display("({}, {})", x, y)]
pub struct Coord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coord {
    /// Creates a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Swaps the axes.
    pub const fn transpose(self) -> Self {
        Self::new(self.y, self.x)
    }

    /// Returns true if the cell lies on the board.
    pub const fn in_bounds(self) -> bool {
        self.x >= 0 && self.x < BOARD_WIDTH && self.y >= 0 && self.y < BOARD_HEIGHT
    }

    /// Returns true if a piece anchored here could overlap the board.
    ///
    /// Origins failing this are rejected before any cell offset is added,
    /// so arbitrary client coordinates never overflow.
    pub const fn within_reach(self) -> bool {
        self.x > -MAX_SHAPE_EXTENT
            && self.x < BOARD_WIDTH + MAX_SHAPE_EXTENT
            && self.y > -MAX_SHAPE_EXTENT
            && self.y < BOARD_HEIGHT + MAX_SHAPE_EXTENT
    }

    /// The four orthogonal neighbours of this cell, on or off the board.
    pub fn edge_neighbors(self) -> impl Iterator<Item = Coord> {
        EDGES.into_iter().map(move |d| self + d)
    }

    /// The four diagonal neighbours of this cell, on or off the board.
    pub fn corner_neighbors(self) -> impl Iterator<Item = Coord> {
        CORNERS.into_iter().map(move |d| self + d)
    }

    /// Iterates every cell of the board in row-major order.
    pub fn all_cells() -> impl Iterator<Item = Coord> {
        (0..BOARD_HEIGHT).flat_map(|y| (0..BOARD_WIDTH).map(move |x| Coord::new(x, y)))
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        self + -rhs
    }
}

impl Neg for Coord {
    type Output = Coord;

    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

/// Orthogonal (shared-edge) neighbour offsets.
pub const EDGES: [Coord; 4] = [
    Coord::new(1, 0),
    Coord::new(0, -1),
    Coord::new(-1, 0),
    Coord::new(0, 1),
];

/// Diagonal (shared-corner) neighbour offsets.
pub const CORNERS: [Coord; 4] = [
    Coord::new(1, 1),
    Coord::new(1, -1),
    Coord::new(-1, 1),
    Coord::new(-1, -1),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Coord::new(3, -2);
        let b = Coord::new(1, 5);
        assert_eq!(a + b, Coord::new(4, 3));
        assert_eq!(a - b, Coord::new(2, -7));
        assert_eq!(-a, Coord::new(-3, 2));
        assert_eq!(a.transpose(), Coord::new(-2, 3));
    }

    #[test]
    fn test_bounds() {
        assert!(Coord::new(0, 0).in_bounds());
        assert!(Coord::new(20, 20).in_bounds());
        assert!(!Coord::new(21, 0).in_bounds());
        assert!(!Coord::new(0, -1).in_bounds());
        assert_eq!(Coord::all_cells().count(), 441);
    }

    #[test]
    fn test_reach_excludes_far_origins() {
        assert!(Coord::new(-4, 0).within_reach());
        assert!(Coord::new(25, 25).within_reach());
        assert!(!Coord::new(-5, 0).within_reach());
        assert!(!Coord::new(i32::MAX, 0).within_reach());
        assert!(!Coord::new(0, i32::MIN).within_reach());
    }

    #[test]
    fn test_neighbour_sets_are_disjoint() {
        for e in EDGES {
            assert!(!CORNERS.contains(&e));
            assert_eq!(e.x.abs() + e.y.abs(), 1);
        }
        for c in CORNERS {
            assert_eq!(c.x.abs(), 1);
            assert_eq!(c.y.abs(), 1);
        }
    }
}
