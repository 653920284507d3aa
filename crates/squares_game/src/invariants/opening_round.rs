//! Opening round ends exactly when player 3 has moved.

use super::Invariant;
use crate::game::GameState;
use crate::ids::{PlayerId, ShapeId};

/// Invariant: `first_round` is set iff player 3 has placed nothing.
pub struct OpeningRoundInvariant;

impl Invariant<GameState> for OpeningRoundInvariant {
    fn holds(game: &GameState) -> bool {
        let last = PlayerId::ALL[3];
        let last_has_moved = ShapeId::all().any(|s| game.is_used(last, s));
        game.first_round() != last_has_moved
    }

    fn description() -> &'static str {
        "Opening round lasts until player 3 places a piece"
    }
}
