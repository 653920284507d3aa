//! Pre- and postconditions around [`GameState::commit`].

use crate::action::{MoveError, Placement};
use crate::game::GameState;
use crate::ids::PlayerId;
use tracing::warn;

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks that the action may be applied to `state`.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks the transition from `before` to `after`.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has not ended.
pub struct GameRunning;

impl GameRunning {
    /// Fails with [`MoveError::GameOver`] once nobody can move.
    pub fn check(game: &GameState) -> Result<(), MoveError> {
        match game.active_player() {
            Some(_) => Ok(()),
            None => Err(MoveError::GameOver),
        }
    }
}

/// Precondition: the player is on the move.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`MoveError::NotYourTurn`] for any other seat.
    pub fn check(player: PlayerId, game: &GameState) -> Result<(), MoveError> {
        if game.active_player() == Some(player) {
            Ok(())
        } else {
            Err(MoveError::NotYourTurn(player))
        }
    }
}

/// Precondition: the piece is unused and fits the round's rules.
pub struct LegalPlacement;

impl LegalPlacement {
    /// Distinguishes a spent piece from a geometric rule failure.
    pub fn check(
        player: PlayerId,
        placement: &Placement,
        game: &GameState,
    ) -> Result<(), MoveError> {
        if game.is_used(player, placement.shape) {
            return Err(MoveError::ShapeUsed(player, placement.shape));
        }
        if !game.try_place(placement, player) {
            return Err(MoveError::IllegalPlacement(*placement));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Placement Contract
// ─────────────────────────────────────────────────────────────

/// Contract for committing a placement.
///
/// Preconditions, in order: game running, player's turn, legal placement.
/// Postconditions: every [`GameInvariants`](crate::GameInvariants) member
/// holds and the mover's score grew.
pub struct PlacementContract;

impl Contract<GameState, (PlayerId, Placement)> for PlacementContract {
    fn pre(game: &GameState, (player, placement): &(PlayerId, Placement)) -> Result<(), MoveError> {
        GameRunning::check(game)?;
        PlayersTurn::check(*player, game)?;
        LegalPlacement::check(*player, placement, game)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), MoveError> {
        after.check_invariants().map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(violations = %descriptions, "Postcondition failed");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })?;

        let grew = PlayerId::ALL
            .into_iter()
            .any(|p| after.score(p) > before.score(p));
        if grew {
            Ok(())
        } else {
            Err(MoveError::InvariantViolation(
                "Postcondition failed: no cells were claimed".to_string(),
            ))
        }
    }
}
