//! The eight dihedral orientations and symmetry-aware cycling.

use super::catalog::catalog_shape;
use crate::ids::ShapeId;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Number of raw orientation indices.
pub const NUM_ORIENTATIONS: usize = 8;

/// One of the eight rotate/mirror transforms of a shape.
///
/// Indices 0..4 are clockwise quarter turns; 4..8 are the same turns
/// applied to the horizontally mirrored shape. Construction reduces the
/// index mod 8, so any integer names a valid orientation.
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
#[serde(from = "u8", into = "u8")]
#[display("{}", _0)]
pub struct Orientation(u8);

impl Orientation {
    /// The identity transform.
    pub const IDENTITY: Orientation = Orientation(0);

    /// Every raw orientation index.
    pub const ALL: [Orientation; NUM_ORIENTATIONS] = [
        Orientation(0),
        Orientation(1),
        Orientation(2),
        Orientation(3),
        Orientation(4),
        Orientation(5),
        Orientation(6),
        Orientation(7),
    ];

    /// Creates an orientation from any index, reduced mod 8.
    pub const fn new(index: u32) -> Self {
        Self((index % NUM_ORIENTATIONS as u32) as u8)
    }

    /// Raw index in 0..8.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// True for the quarter and three-quarter turns, which swap the
    /// bounding box.
    pub const fn swaps_axes(self) -> bool {
        self.0 % 2 == 1
    }
}

impl From<u8> for Orientation {
    fn from(value: u8) -> Self {
        Self::new(value as u32)
    }
}

impl From<Orientation> for u8 {
    fn from(o: Orientation) -> u8 {
        o.0
    }
}

/// A set of orientations, bit `i` for orientation `i`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OrientationMask(u8);

impl OrientationMask {
    /// Wraps raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if the orientation is a member.
    pub const fn contains(self, o: Orientation) -> bool {
        self.0 & (1 << o.0) != 0
    }

    /// Number of members.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true if there are no members.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in increasing index order.
    pub fn iter(self) -> impl Iterator<Item = Orientation> {
        Orientation::ALL.into_iter().filter(move |o| self.contains(*o))
    }
}

/// Geometrically distinct orientations of a shape.
///
/// The identity is always a member. Shapes symmetric under every
/// transform keep only the identity; straight lines keep the identity and
/// one quarter turn.
pub fn available_orientations(id: ShapeId) -> OrientationMask {
    let base = catalog_shape(id);
    let bits = match (base.mirror_symmetric(), base.rotation_symmetric()) {
        (true, true) if base.width() == base.height() => 0b0000_0001,
        (true, true) => 0b0000_0011,
        (true, false) => 0b0000_1111,
        (false, true) => 0b0011_0011,
        (false, false) => 0b1111_1111,
    };
    OrientationMask::from_bits(bits)
}

/// The next distinct orientation after `current`, wrapping around.
///
/// An orientation outside the distinct set moves to the next member above it.
pub fn next_orientation(id: ShapeId, current: Orientation) -> Orientation {
    let mask = available_orientations(id);
    mask.iter()
        .find(|o| *o > current)
        .or_else(|| mask.iter().next())
        .unwrap_or(Orientation::IDENTITY)
}

/// The distinct orientation before `current`, wrapping around.
pub fn prev_orientation(id: ShapeId, current: Orientation) -> Orientation {
    let mask = available_orientations(id);
    mask.iter()
        .filter(|o| *o < current)
        .last()
        .or_else(|| mask.iter().last())
        .unwrap_or(Orientation::IDENTITY)
}
