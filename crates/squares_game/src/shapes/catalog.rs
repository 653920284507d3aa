//! The fixed 21-piece catalog and the orientation transform.

use super::orientation::{NUM_ORIENTATIONS, Orientation};
use crate::geometry::Coord;
use crate::ids::{NUM_SHAPES, ShapeId};
use std::sync::LazyLock;

/// A polyomino: unit cells inside a bounding box, plus the two symmetry
/// flags that decide how many orientations are distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    cells: Vec<Coord>,
    width: i32,
    height: i32,
    mirror_symmetric: bool,
    rotation_symmetric: bool,
}

impl Shape {
    /// Cell offsets relative to the top-left of the bounding box.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Bounding box width.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Bounding box height.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of unit cells.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// True if the shape equals its own mirror image up to rotation.
    pub fn mirror_symmetric(&self) -> bool {
        self.mirror_symmetric
    }

    /// True if the shape is unchanged by a half turn.
    pub fn rotation_symmetric(&self) -> bool {
        self.rotation_symmetric
    }

    /// Applies one of the eight dihedral transforms.
    ///
    /// Odd orientations swap width and height first; every formula is
    /// written against the transformed box so the result stays anchored
    /// at the origin.
    pub fn rotate(&self, orientation: Orientation) -> Shape {
        let (w, h) = if orientation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        let cells = self
            .cells
            .iter()
            .map(|&Coord { x, y }| match orientation.index() {
                1 => Coord::new(w - y - 1, x),
                2 => Coord::new(w - x - 1, h - y - 1),
                3 => Coord::new(y, h - x - 1),
                4 => Coord::new(w - x - 1, y),
                5 => Coord::new(w - y - 1, h - x - 1),
                6 => Coord::new(x, h - y - 1),
                7 => Coord::new(y, x),
                _ => Coord::new(x, y),
            })
            .collect();
        Shape {
            cells,
            width: w,
            height: h,
            mirror_symmetric: self.mirror_symmetric,
            rotation_symmetric: self.rotation_symmetric,
        }
    }

    /// Cells sorted, for order-insensitive comparison.
    pub fn normalized_cells(&self) -> Vec<Coord> {
        let mut cells = self.cells.clone();
        cells.sort();
        cells
    }
}

type Def = (&'static [(i32, i32)], i32, i32, bool, bool);

// (cells, width, height, mirror symmetric, rotation symmetric)
const DEFINITIONS: [Def; NUM_SHAPES] = [
    (&[(0, 0)], 1, 1, true, true),
    (&[(0, 0), (1, 0)], 2, 1, true, true),
    (&[(0, 0), (1, 0), (2, 0)], 3, 1, true, true),
    (&[(0, 0), (1, 0), (0, 1)], 2, 2, true, false),
    (&[(0, 0), (1, 0), (2, 0), (3, 0)], 4, 1, true, true),
    (&[(0, 0), (1, 0), (2, 0), (0, 1)], 3, 2, false, false),
    (&[(0, 0), (1, 0), (1, 1), (2, 1)], 3, 2, false, true),
    (&[(0, 0), (1, 0), (2, 0), (1, 1)], 3, 2, true, false),
    (&[(0, 0), (1, 0), (0, 1), (1, 1)], 2, 2, true, true),
    (&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)], 5, 1, true, true),
    (&[(0, 0), (1, 0), (2, 0), (3, 0), (0, 1)], 4, 2, false, false),
    (&[(0, 0), (1, 0), (1, 1), (2, 1), (3, 1)], 4, 2, false, false),
    (&[(0, 0), (1, 0), (2, 0), (3, 0), (1, 1)], 4, 2, false, false),
    (&[(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)], 3, 3, true, false),
    (&[(0, 0), (1, 0), (1, 1), (1, 2), (2, 2)], 3, 3, false, true),
    (&[(0, 0), (0, 1), (1, 1), (2, 1), (1, 2)], 3, 3, false, false),
    (&[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)], 3, 3, true, true),
    (&[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)], 3, 3, true, false),
    (&[(0, 0), (0, 1), (1, 1), (2, 1), (0, 2)], 3, 3, true, false),
    (&[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)], 3, 2, false, false),
    (&[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)], 3, 2, true, false),
];

// Every (shape, orientation) pair, computed once.
static ORIENTED: LazyLock<Vec<[Shape; NUM_ORIENTATIONS]>> = LazyLock::new(|| {
    DEFINITIONS
        .iter()
        .map(|&(cells, width, height, mirror_symmetric, rotation_symmetric)| {
            let base = Shape {
                cells: cells.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
                width,
                height,
                mirror_symmetric,
                rotation_symmetric,
            };
            Orientation::ALL.map(|o| base.rotate(o))
        })
        .collect()
});

/// The shape in its catalog orientation.
pub fn catalog_shape(id: ShapeId) -> &'static Shape {
    &ORIENTED[id.index()][0]
}

/// Cell geometry of a shape in the given orientation.
pub fn shape(id: ShapeId, orientation: Orientation) -> &'static Shape {
    &ORIENTED[id.index()][orientation.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        let sizes: Vec<usize> = ShapeId::all().map(|id| catalog_shape(id).size()).collect();
        assert_eq!(sizes.iter().filter(|&&n| n == 1).count(), 1);
        assert_eq!(sizes.iter().filter(|&&n| n == 2).count(), 1);
        assert_eq!(sizes.iter().filter(|&&n| n == 3).count(), 2);
        assert_eq!(sizes.iter().filter(|&&n| n == 4).count(), 5);
        assert_eq!(sizes.iter().filter(|&&n| n == 5).count(), 12);
        assert_eq!(sizes.iter().sum::<usize>(), 89);
    }

    #[test]
    fn test_cells_fit_bounding_box() {
        for id in ShapeId::all() {
            for o in Orientation::ALL {
                let s = shape(id, o);
                for c in s.cells() {
                    assert!(c.x >= 0 && c.x < s.width(), "{id} o{o} x out of box");
                    assert!(c.y >= 0 && c.y < s.height(), "{id} o{o} y out of box");
                }
            }
        }
    }

    #[test]
    fn test_quarter_turn_swaps_box() {
        let l = shape(ShapeId::new(10).unwrap(), Orientation::new(1));
        assert_eq!((l.width(), l.height()), (2, 4));
        let l = shape(ShapeId::new(10).unwrap(), Orientation::new(6));
        assert_eq!((l.width(), l.height()), (4, 2));
    }

    #[test]
    fn test_specific_transforms() {
        // L tromino {(0,0),(1,0),(0,1)} turned clockwise keeps (1,0) and (1,1)
        let s = shape(ShapeId::new(3).unwrap(), Orientation::new(1));
        assert_eq!(
            s.normalized_cells(),
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(1, 1)]
        );
        // Transpose of a horizontal domino is vertical
        let d = shape(ShapeId::new(1).unwrap(), Orientation::new(7));
        assert_eq!(d.normalized_cells(), vec![Coord::new(0, 0), Coord::new(0, 1)]);
    }
}
