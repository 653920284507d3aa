//! Owned cells agree with the usage table.

use super::Invariant;
use crate::game::GameState;
use crate::ids::{PlayerId, ShapeId};
use crate::shapes::catalog_shape;

/// Invariant: each player owns exactly as many cells as the pieces they
/// have used add up to.
pub struct UsageConsistentInvariant;

impl Invariant<GameState> for UsageConsistentInvariant {
    fn holds(game: &GameState) -> bool {
        PlayerId::ALL.into_iter().all(|player| {
            let spent: usize = ShapeId::all()
                .filter(|s| game.is_used(player, *s))
                .map(|s| catalog_shape(s).size())
                .sum();
            spent == game.score(player)
        })
    }

    fn description() -> &'static str {
        "Cells owned by each player equal the total size of the pieces they used"
    }
}
