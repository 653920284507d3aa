//! Full-state snapshot sent on connect and reconnect.

use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use squares_game::{
    BOARD_SIZE, Board, GameState, Grid, NUM_PLAYERS, NUM_SHAPES, PlayerId, UsageTable,
};

const SIDE: usize = BOARD_SIZE as usize;

/// Wire encoding of the active player: the seat index, or -1 once the game
/// is over.
pub fn active_player_to_wire(active: Option<PlayerId>) -> i8 {
    active.map_or(-1, |p| p.index() as i8)
}

/// Inverse of [`active_player_to_wire`]; any negative value means over.
pub fn active_player_from_wire(raw: i8) -> Result<Option<PlayerId>, SnapshotError> {
    if raw < 0 {
        return Ok(None);
    }
    PlayerId::new(raw as u8)
        .map(Some)
        .ok_or(SnapshotError::ActivePlayer(raw))
}

/// Serde adapter for `Option<PlayerId>` fields carried as `i8`.
pub(crate) mod wire_active {
    use super::{active_player_from_wire, active_player_to_wire};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use squares_game::PlayerId;

    pub fn serialize<S: Serializer>(active: &Option<PlayerId>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i8(active_player_to_wire(*active))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<PlayerId>, D::Error> {
        let raw = i8::deserialize(d)?;
        active_player_from_wire(raw).map_err(D::Error::custom)
    }
}

/// Everything a client needs to rebuild the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// `board[y][x]`: seat index of the owner, or -1 for empty.
    pub board: [[i8; SIDE]; SIDE],
    /// `used[player][shape]`.
    pub used: [[bool; NUM_SHAPES]; NUM_PLAYERS],
    /// Seat on the move, -1 once the game is over.
    pub active_player: i8,
    /// True until player 3 has placed their opening piece.
    pub first_round: bool,
}

impl GameSnapshot {
    /// Snapshot of a match that has not started.
    pub fn lobby() -> Self {
        Self::from(&GameState::new())
    }
}

impl From<&GameState> for GameSnapshot {
    fn from(game: &GameState) -> Self {
        let mut board = [[-1i8; SIDE]; SIDE];
        for (row, cells) in board.iter_mut().zip(game.board().grid()) {
            for (out, owner) in row.iter_mut().zip(cells) {
                *out = owner.map_or(-1, |p| p.index() as i8);
            }
        }
        Self {
            board,
            used: *game.board().usage(),
            active_player: active_player_to_wire(game.active_player()),
            first_round: game.first_round(),
        }
    }
}

impl TryFrom<&GameSnapshot> for GameState {
    type Error = SnapshotError;

    fn try_from(snapshot: &GameSnapshot) -> Result<Self, Self::Error> {
        let mut grid: Grid = [[None; SIDE]; SIDE];
        for (y, row) in snapshot.board.iter().enumerate() {
            for (x, &owner) in row.iter().enumerate() {
                grid[y][x] = match owner {
                    -1 => None,
                    n => Some(
                        u8::try_from(n)
                            .ok()
                            .and_then(PlayerId::new)
                            .ok_or(SnapshotError::CellOwner { x, y, owner })?,
                    ),
                };
            }
        }
        let used: UsageTable = snapshot.used;
        let active = active_player_from_wire(snapshot.active_player)?;
        Ok(GameState::from_parts(
            Board::from_parts(grid, used),
            active,
            snapshot.first_round,
        ))
    }
}

impl TryFrom<GameSnapshot> for GameState {
    type Error = SnapshotError;

    fn try_from(snapshot: GameSnapshot) -> Result<Self, Self::Error> {
        GameState::try_from(&snapshot)
    }
}
