//! Ownership grid, usage table and the placement validator.

use crate::action::Placement;
use crate::geometry::{BOARD_HEIGHT, BOARD_WIDTH, Coord};
use crate::ids::{NUM_PLAYERS, NUM_SHAPES, PlayerId, ShapeId};

const W: usize = BOARD_WIDTH as usize;
const H: usize = BOARD_HEIGHT as usize;

/// Cell owners in row-major order, `grid[y][x]`.
pub type Grid = [[Option<PlayerId>; W]; H];

/// `used[player][shape]`.
pub type UsageTable = [[bool; NUM_SHAPES]; NUM_PLAYERS];

/// The 21×21 board plus the record of which pieces each player has spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    used: UsageTable,
}

impl Board {
    /// Creates an empty board with every piece unused.
    pub fn new() -> Self {
        Self {
            grid: [[None; W]; H],
            used: [[false; NUM_SHAPES]; NUM_PLAYERS],
        }
    }

    /// Rebuilds a board from raw parts without checking consistency.
    pub fn from_parts(grid: Grid, used: UsageTable) -> Self {
        Self { grid, used }
    }

    /// Owner of a cell; `None` for empty or off-board cells.
    pub fn cell(&self, c: Coord) -> Option<PlayerId> {
        if c.in_bounds() {
            self.grid[c.y as usize][c.x as usize]
        } else {
            None
        }
    }

    /// Returns true if the cell is on the board and unowned.
    pub fn is_empty(&self, c: Coord) -> bool {
        c.in_bounds() && self.grid[c.y as usize][c.x as usize].is_none()
    }

    /// Returns true if the player already committed this piece.
    pub fn is_used(&self, player: PlayerId, shape: ShapeId) -> bool {
        self.used[player.index()][shape.index()]
    }

    /// Pieces the player has not placed yet.
    pub fn unused_shapes(&self, player: PlayerId) -> impl Iterator<Item = ShapeId> + '_ {
        ShapeId::all().filter(move |s| !self.is_used(player, *s))
    }

    /// Raw grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Raw usage table.
    pub fn usage(&self) -> &UsageTable {
        &self.used
    }

    /// Number of cells the player owns.
    pub fn owned_cells(&self, player: PlayerId) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|owner| **owner == Some(player))
            .count()
    }

    /// Checks a placement without mutating anything.
    ///
    /// In the opening round the piece must lie on the board and cover the
    /// player's start corner. Afterwards it must lie on empty cells, touch
    /// none of the player's cells along an edge, and touch at least one of
    /// them at a corner.
    pub fn try_place(&self, placement: &Placement, player: PlayerId, first_round: bool) -> bool {
        if self.is_used(player, placement.shape) || !placement.on_board() {
            return false;
        }

        if first_round {
            let corner = player.start_corner();
            return placement.cells().any(|c| c == corner);
        }

        if !placement.cells().all(|c| self.is_empty(c)) {
            return false;
        }

        // The edge rule can fail on any cell, so scan them all.
        let mut touches_corner = false;
        for c in placement.cells() {
            if c.edge_neighbors().any(|n| self.cell(n) == Some(player)) {
                return false;
            }
            touches_corner |= c.corner_neighbors().any(|n| self.cell(n) == Some(player));
        }
        touches_corner
    }

    /// Commits a placement.
    ///
    /// The caller must have just received `true` from [`Board::try_place`]
    /// with the same arguments; nothing is re-validated here.
    pub fn place(&mut self, placement: &Placement, player: PlayerId) {
        for c in placement.cells() {
            self.grid[c.y as usize][c.x as usize] = Some(player);
        }
        self.used[player.index()][placement.shape.index()] = true;
    }

    /// Formats the board as text, `.` for empty and the seat digit otherwise.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity((W + 1) * H);
        for row in &self.grid {
            for owner in row {
                out.push(match owner {
                    Some(p) => char::from(b'0' + p.index() as u8),
                    None => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Orientation;

    fn mono(x: i32, y: i32) -> Placement {
        Placement::new(ShapeId::new(0).unwrap(), Orientation::IDENTITY, Coord::new(x, y))
    }

    fn p(n: u8) -> PlayerId {
        PlayerId::new(n).unwrap()
    }

    #[test]
    fn test_opening_requires_own_corner() {
        let board = Board::new();
        assert!(board.try_place(&mono(0, 0), p(0), true));
        assert!(!board.try_place(&mono(0, 0), p(1), true));
        assert!(board.try_place(&mono(20, 0), p(1), true));
        assert!(board.try_place(&mono(20, 20), p(2), true));
        assert!(board.try_place(&mono(0, 20), p(3), true));
    }

    #[test]
    fn test_opening_rejects_overhang() {
        let board = Board::new();
        let long_bar = ShapeId::new(9).unwrap();
        let bar = Placement::new(long_bar, Orientation::IDENTITY, Coord::new(17, 0));
        assert!(!board.try_place(&bar, p(1), true));
        let bar = Placement::new(long_bar, Orientation::IDENTITY, Coord::new(16, 0));
        assert!(board.try_place(&bar, p(1), true));
    }

    #[test]
    fn test_edge_contact_rejected_corner_contact_accepted() {
        let mut board = Board::new();
        board.place(&mono(0, 0), p(0));
        let domino = ShapeId::new(1).unwrap();

        let side = Placement::new(domino, Orientation::IDENTITY, Coord::new(1, 0));
        assert!(!board.try_place(&side, p(0), false));

        let diagonal = Placement::new(domino, Orientation::IDENTITY, Coord::new(1, 1));
        assert!(board.try_place(&diagonal, p(0), false));
    }

    #[test]
    fn test_edge_rule_checked_past_qualifying_corner() {
        let mut board = Board::new();
        board.place(&mono(0, 0), p(0));
        let tromino = Placement::new(
            ShapeId::new(2).unwrap(),
            Orientation::IDENTITY,
            Coord::new(2, 2),
        );
        board.place(&tromino, p(0));
        // Vertical bar at x=1 from y=1: touches (0,0) at a corner first,
        // then runs along (2,2) on an edge further down.
        let bar = Placement::new(ShapeId::new(4).unwrap(), Orientation::new(1), Coord::new(1, 1));
        assert!(!board.try_place(&bar, p(0), false));
    }

    #[test]
    fn test_other_players_do_not_count_as_corners() {
        let mut board = Board::new();
        board.place(&mono(0, 0), p(1));
        assert!(!board.try_place(&mono(1, 1), p(0), false));
        // Edge contact with an opponent is fine when a corner is ours
        board.place(&mono(2, 0), p(0));
        board.place(&mono(0, 1), p(1));
        let d = Placement::new(ShapeId::new(1).unwrap(), Orientation::new(1), Coord::new(1, 1));
        assert!(board.try_place(&d, p(0), false));
    }

    #[test]
    fn test_overlap_and_bounds_rejected() {
        let mut board = Board::new();
        board.place(&mono(5, 5), p(0));
        board.place(&mono(6, 6), p(1));
        assert!(!board.try_place(&mono(6, 6), p(0), false));
        assert!(!board.try_place(&mono(-1, 4), p(0), false));
    }

    #[test]
    fn test_extreme_origins_rejected() {
        let mut board = Board::new();
        board.place(&mono(0, 0), p(0));
        let plus = ShapeId::new(16).unwrap();
        for (x, y) in [(i32::MAX, 0), (0, i32::MAX), (i32::MIN, i32::MIN), (i32::MAX, i32::MAX)] {
            let far = Placement::new(plus, Orientation::IDENTITY, Coord::new(x, y));
            assert!(!board.try_place(&far, p(0), false));
            assert!(!board.try_place(&far, p(1), true));
        }
    }

    #[test]
    fn test_used_shape_rejected_and_recorded() {
        let mut board = Board::new();
        let first = mono(0, 0);
        assert!(board.try_place(&first, p(0), true));
        board.place(&first, p(0));
        assert!(board.is_used(p(0), first.shape));
        assert!(!board.is_used(p(1), first.shape));
        assert!(!board.try_place(&mono(1, 1), p(0), false));
        assert_eq!(board.unused_shapes(p(0)).count(), 20);
        assert_eq!(board.owned_cells(p(0)), 1);
    }

    #[test]
    fn test_display() {
        let mut board = Board::new();
        board.place(&mono(0, 0), p(0));
        board.place(&mono(20, 20), p(2));
        let text = board.display();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 21);
        assert!(lines[0].starts_with("0."));
        assert!(lines[20].ends_with(".2"));
    }
}
