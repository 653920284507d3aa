//! Legal-move search used to decide elimination.
//!
//! Any later-round placement must cover an empty cell that touches the
//! player's territory at a corner but not along an edge. The search only
//! anchors pieces on those candidate cells, so its cost follows the
//! frontier of the player's territory instead of the whole board.

use crate::action::Placement;
use crate::board::Board;
use crate::geometry::{BOARD_HEIGHT, BOARD_WIDTH, Coord};
use crate::ids::PlayerId;
use crate::shapes::{Orientation, available_orientations, shape};

/// How a cell relates to one player's territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    /// Not adjacent to the player at all.
    Unrelated,
    /// Empty, diagonal to the player, not orthogonal to them.
    Candidate,
    /// Occupied by anyone, or orthogonal to the player.
    Blocked,
}

impl Board {
    /// Classifies one cell relative to `player`.
    pub fn cell_status(&self, c: Coord, player: PlayerId) -> CellStatus {
        let own = |n: Coord| self.cell(n) == Some(player);
        if self.cell(c).is_some() || c.edge_neighbors().any(own) {
            CellStatus::Blocked
        } else if c.corner_neighbors().any(own) {
            CellStatus::Candidate
        } else {
            CellStatus::Unrelated
        }
    }

    /// Every candidate cell for `player`, row-major.
    pub fn candidate_cells(&self, player: PlayerId) -> Vec<Coord> {
        Coord::all_cells()
            .filter(|&c| self.cell_status(c, player) == CellStatus::Candidate)
            .collect()
    }

    /// Returns true if `player` has at least one later-round placement.
    ///
    /// Tries every unused piece in all eight raw orientations with each of
    /// its cells laid on each candidate cell, stopping at the first legal
    /// one.
    pub fn has_legal_move(&self, player: PlayerId) -> bool {
        let candidates = self.candidate_cells(player);
        if candidates.is_empty() {
            return false;
        }
        for id in self.unused_shapes(player) {
            for orientation in Orientation::ALL {
                let oriented = shape(id, orientation);
                for &anchor in &candidates {
                    for &offset in oriented.cells() {
                        let placement = Placement::new(id, orientation, anchor - offset);
                        if self.try_place(&placement, player, false) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Every distinct legal placement for `player` under the given round's
    /// rules.
    ///
    /// Brute force over the whole board, independent of the candidate-cell
    /// shortcut in [`Board::has_legal_move`].
    pub fn legal_placements(&self, player: PlayerId, first_round: bool) -> Vec<Placement> {
        let mut found = Vec::new();
        for id in self.unused_shapes(player) {
            for orientation in available_orientations(id).iter() {
                let oriented = shape(id, orientation);
                for y in 0..=BOARD_HEIGHT - oriented.height() {
                    for x in 0..=BOARD_WIDTH - oriented.width() {
                        let placement = Placement::new(id, orientation, Coord::new(x, y));
                        if self.try_place(&placement, player, first_round) {
                            found.push(placement);
                        }
                    }
                }
            }
        }
        found
    }
}
