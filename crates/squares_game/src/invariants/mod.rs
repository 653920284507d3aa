//! Properties that hold for every reachable [`GameState`].
//!
//! Each invariant is a zero-sized type so sets of them compose as tuples
//! and are checked together after every commit in debug builds.
//!
//! [`GameState`]: crate::GameState

mod active_player;
mod opening_round;
mod usage_consistent;

pub use active_player::{ActivePlayerInvariant, GameOverInvariant};
pub use opening_round::OpeningRoundInvariant;
pub use usage_consistent::UsageConsistentInvariant;

use crate::game::GameState;

/// A logical property of a state.
pub trait Invariant<S> {
    /// Returns true if the property holds.
    fn holds(state: &S) -> bool;

    /// Human-readable statement of the property.
    fn description() -> &'static str;
}

/// A failed invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Statement of the property that failed.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a violation record.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Invariants checked as one step.
pub trait InvariantSet<S> {
    /// Checks every member, collecting all failures.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn check<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

fn finish(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        finish(violations)
    }
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        check::<S, I3>(state, &mut violations);
        check::<S, I4>(state, &mut violations);
        finish(violations)
    }
}

/// Every game invariant.
pub type GameInvariants = (
    UsageConsistentInvariant,
    OpeningRoundInvariant,
    ActivePlayerInvariant,
    GameOverInvariant,
);

// Shorthand used by the contract.
impl GameState {
    /// Checks [`GameInvariants`] against this state.
    pub fn check_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        GameInvariants::check_all(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Placement;
    use crate::geometry::Coord;
    use crate::ids::{PlayerId, ShapeId};
    use crate::shapes::Orientation;

    #[test]
    fn test_fresh_game_holds() {
        assert!(GameState::new().check_invariants().is_ok());
    }

    #[test]
    fn test_holds_through_opening_round() {
        let mut game = GameState::new();
        for player in PlayerId::ALL {
            let corner = player.start_corner();
            let placement = Placement::new(ShapeId::new(0).unwrap(), Orientation::IDENTITY, corner);
            game.commit(player, placement).unwrap();
            assert!(game.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_unrecorded_cells_detected() {
        let mut game = GameState::new();
        let placement = Placement::new(
            ShapeId::new(0).unwrap(),
            Orientation::IDENTITY,
            Coord::new(0, 0),
        );
        game.commit(PlayerId::ALL[0], placement).unwrap();

        let mut grid = *game.board().grid();
        grid[10][10] = Some(PlayerId::ALL[0]);
        let corrupt = GameState::from_parts(
            crate::board::Board::from_parts(grid, *game.board().usage()),
            game.active_player(),
            game.first_round(),
        );
        let violations = corrupt.check_invariants().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].description, UsageConsistentInvariant::description());
    }

    #[test]
    fn test_pair_composes() {
        type Pair = (OpeningRoundInvariant, GameOverInvariant);
        assert!(Pair::check_all(&GameState::new()).is_ok());
    }
}
