//! Turn engine and game-over state machine.
//!
//! The opening round seats one piece per player on their start corner in
//! seat order. After that every commit recomputes who can still move, the
//! turn passes to the next player who can, and the game ends once nobody
//! can.

use crate::action::{MoveError, Placement};
use crate::board::Board;
use crate::contracts::{Contract, PlacementContract};
use crate::geometry::Coord;
use crate::ids::{PlayerId, PlayerMask, ShapeId};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use tracing::{debug, info, instrument};

/// Coarse phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Phase {
    /// Some player has not placed their first piece.
    Opening,
    /// Corner/edge rules apply and elimination is tracked.
    Main,
    /// Every player has been eliminated.
    Over,
}

/// How a newly eliminated player finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// Nobody else was left standing.
    Won,
    /// At least one other player could still move.
    Lost,
}

/// What a turn advance changed.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct TurnReport {
    /// Who moves next; `None` once the game is over.
    active_player: Option<PlayerId>,
    /// Players eliminated by this advance, in seat order.
    newly_eliminated: Vec<(PlayerId, Outcome)>,
}

impl TurnReport {
    /// Returns true if this advance ended the game.
    pub fn game_over(&self) -> bool {
        self.active_player.is_none()
    }
}

/// Authoritative state of one match.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active_player: Option<PlayerId>,
    first_round: bool,
    // Emptied on every board mutation, filled on first read.
    eliminated: OnceCell<PlayerMask>,
    reported: PlayerMask,
}

impl GameState {
    /// Creates a match with an empty board and player 0 to move.
    pub fn new() -> Self {
        Self::from_parts(Board::new(), Some(PlayerId::ALL[0]), true)
    }

    /// Rebuilds a match from a snapshot's parts.
    ///
    /// Players already unable to move count as reported, so the next
    /// advance does not announce them again.
    pub fn from_parts(board: Board, active_player: Option<PlayerId>, first_round: bool) -> Self {
        let mut state = Self {
            board,
            active_player,
            first_round,
            eliminated: OnceCell::new(),
            reported: PlayerMask::EMPTY,
        };
        state.reported = state.eliminated();
        state
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Owner of a cell.
    pub fn cell(&self, c: Coord) -> Option<PlayerId> {
        self.board.cell(c)
    }

    /// Returns true if the player already placed the piece.
    pub fn is_used(&self, player: PlayerId, shape: ShapeId) -> bool {
        self.board.is_used(player, shape)
    }

    /// Seat on the move, or `None` once the game is over.
    pub fn active_player(&self) -> Option<PlayerId> {
        self.active_player
    }

    /// True until player 3 has placed their opening piece.
    pub fn first_round(&self) -> bool {
        self.first_round
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        match (self.first_round, self.active_player) {
            (true, _) => Phase::Opening,
            (false, Some(_)) => Phase::Main,
            (false, None) => Phase::Over,
        }
    }

    /// Checks a placement for `player` under the current round's rules.
    pub fn try_place(&self, placement: &Placement, player: PlayerId) -> bool {
        self.board.try_place(placement, player, self.first_round)
    }

    /// Commits a validated placement without advancing the turn.
    ///
    /// See [`Board::place`] for the contract.
    pub fn place(&mut self, placement: &Placement, player: PlayerId) {
        self.board.place(placement, player);
        self.eliminated = OnceCell::new();
    }

    /// Returns true if the player has any later-round placement left.
    pub fn has_legal_move(&self, player: PlayerId) -> bool {
        self.board.has_legal_move(player)
    }

    /// Players with no legal placement.
    ///
    /// Always empty during the opening round. Computed on first read after
    /// each commit.
    pub fn eliminated(&self) -> PlayerMask {
        *self.eliminated.get_or_init(|| {
            if self.first_round {
                return PlayerMask::EMPTY;
            }
            let mask: PlayerMask = PlayerId::ALL
                .into_iter()
                .filter(|p| !self.board.has_legal_move(*p))
                .collect();
            debug!(eliminated = mask.bits(), "Recomputed elimination mask");
            mask
        })
    }

    /// Every distinct legal placement for the player under the current
    /// round's rules.
    pub fn legal_placements(&self, player: PlayerId) -> Vec<Placement> {
        self.board.legal_placements(player, self.first_round)
    }

    /// Cells owned by the player.
    pub fn score(&self, player: PlayerId) -> usize {
        self.board.owned_cells(player)
    }

    /// Validates, places and advances in one step.
    ///
    /// The move is applied to a copy and written back only once the
    /// postconditions (debug builds) pass, so an `Err` never leaves a
    /// half-applied state behind.
    #[instrument(skip_all, fields(player = %player, placement = %placement))]
    pub fn commit(
        &mut self,
        player: PlayerId,
        placement: Placement,
    ) -> Result<TurnReport, MoveError> {
        PlacementContract::pre(self, &(player, placement))?;

        let mut next = self.clone();
        next.place(&placement, player);
        let report = next.advance_turn();

        #[cfg(debug_assertions)]
        PlacementContract::post(self, &next)?;

        *self = next;
        Ok(report)
    }

    /// Passes the turn after a commit.
    ///
    /// During the opening round the turn goes to the next seat, and the
    /// round ends with player 3. Otherwise elimination is recomputed and
    /// the turn goes to the next player who can still move.
    #[instrument(skip(self))]
    pub fn advance_turn(&mut self) -> TurnReport {
        let Some(current) = self.active_player else {
            return TurnReport {
                active_player: None,
                newly_eliminated: Vec::new(),
            };
        };

        if self.first_round {
            if current != PlayerId::ALL[3] {
                self.active_player = Some(current.next());
                return TurnReport {
                    active_player: self.active_player,
                    newly_eliminated: Vec::new(),
                };
            }
            info!("Opening round complete");
            self.first_round = false;
            self.eliminated = OnceCell::new();
        }

        let eliminated = self.eliminated();
        let fresh = eliminated.difference(self.reported);
        self.reported = eliminated;

        let outcome = if eliminated.is_full() {
            Outcome::Won
        } else {
            Outcome::Lost
        };
        let newly_eliminated: Vec<_> = fresh.iter().map(|p| (p, outcome)).collect();
        for (player, outcome) in &newly_eliminated {
            info!(
                player = %player,
                outcome = %outcome,
                score = self.score(*player),
                "Player eliminated"
            );
        }

        let mut next = current.next();
        self.active_player = loop {
            if eliminated.is_full() {
                break None;
            }
            if !eliminated.contains(next) {
                break Some(next);
            }
            next = next.next();
        };

        if self.active_player.is_none() {
            info!("Game over");
        }

        TurnReport {
            active_player: self.active_player,
            newly_eliminated,
        }
    }

    /// Applies a move that an authoritative peer already committed.
    ///
    /// Used by clients mirroring the server: the cells are placed without
    /// validation and the broadcast's active player is adopted as-is.
    pub fn replay(
        &mut self,
        player: PlayerId,
        placement: &Placement,
        active_after: Option<PlayerId>,
    ) {
        self.place(placement, player);
        if self.first_round && player == PlayerId::ALL[3] {
            self.first_round = false;
        }
        self.active_player = active_after;
        self.reported = self.eliminated();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.active_player == other.active_player
            && self.first_round == other.first_round
    }
}

impl Eq for GameState {}
