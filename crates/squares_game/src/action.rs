//! First-class placement actions.
//!
//! A placement names a piece, an orientation and the board cell that the
//! top-left of the oriented bounding box lands on. Placements can be
//! validated, logged and sent over the wire independently of execution.

use crate::geometry::Coord;
use crate::ids::{PlayerId, ShapeId};
use crate::shapes::{Orientation, shape};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// A piece placed at an origin in a given orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{} o{} at {}", shape, orientation, origin)]
pub struct Placement {
    /// Which piece.
    pub shape: ShapeId,
    /// Which of the eight transforms.
    pub orientation: Orientation,
    /// Board cell under the oriented bounding box's top-left corner.
    pub origin: Coord,
}

impl Placement {
    /// Creates a placement.
    pub fn new(shape: ShapeId, orientation: Orientation, origin: Coord) -> Self {
        Self {
            shape,
            orientation,
            origin,
        }
    }

    /// Absolute board cells this placement would cover.
    ///
    /// The origin must satisfy [`Coord::within_reach`]; check
    /// [`Placement::on_board`] first for untrusted input.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        shape(self.shape, self.orientation)
            .cells()
            .iter()
            .map(move |&c| c + self.origin)
    }

    /// Returns true if every covered cell lies on the board.
    pub fn on_board(&self) -> bool {
        self.origin.within_reach() && self.cells().all(Coord::in_bounds)
    }
}

/// Why a commit was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The player already placed this piece.
    #[display("{} already used {}", _0, _1)]
    ShapeUsed(PlayerId, ShapeId),

    /// The placement breaks the bounds, overlap, corner or edge rule.
    #[display("Illegal placement: {}", _0)]
    IllegalPlacement(#[error(not(source))] Placement),

    /// Someone else is on the move.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(#[error(not(source))] PlayerId),

    /// Every player has been eliminated.
    #[display("Game is already over")]
    GameOver,

    /// A postcondition failed after the commit.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(#[error(not(source))] String),
}
