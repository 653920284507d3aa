//! The turn never rests on an eliminated player.

use super::Invariant;
use crate::game::GameState;

/// Invariant: the active player, if any, can still move.
pub struct ActivePlayerInvariant;

impl Invariant<GameState> for ActivePlayerInvariant {
    fn holds(game: &GameState) -> bool {
        game.active_player()
            .is_none_or(|p| !game.eliminated().contains(p))
    }

    fn description() -> &'static str {
        "Active player is not eliminated"
    }
}

/// Invariant: nobody is on the move iff everybody is eliminated.
pub struct GameOverInvariant;

impl Invariant<GameState> for GameOverInvariant {
    fn holds(game: &GameState) -> bool {
        game.active_player().is_none() == game.eliminated().is_full()
    }

    fn description() -> &'static str {
        "Game is over exactly when all four players are eliminated"
    }
}
