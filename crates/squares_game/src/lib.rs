//! Rule engine for a four-player polyomino corner game.
//!
//! Each player owns the same 21 pieces and starts from their own board
//! corner. After the opening round a new piece must touch the owner's
//! territory diagonally and never along an edge. Players who cannot place
//! anything are eliminated, and the game ends when all four are.
//!
//! # Architecture
//!
//! - **Shapes**: constant catalog plus the eight dihedral orientations
//! - **Board**: ownership grid, usage table and the placement validator
//! - **Elimination**: frontier-anchored legal-move search
//! - **Game**: turn engine with lazily cached elimination
//! - **Invariants/Contracts**: properties checked on every commit
//!
//! Everything here is synchronous and free of I/O.
//!
//! # Example
//!
//! ```
//! use squares_game::{Coord, GameState, Orientation, Placement, PlayerId, ShapeId};
//!
//! let mut game = GameState::new();
//! let monomino = ShapeId::new(0).unwrap();
//! let report = game
//!     .commit(PlayerId::ALL[0], Placement::new(monomino, Orientation::IDENTITY, Coord::new(0, 0)))
//!     .unwrap();
//! assert_eq!(*report.active_player(), PlayerId::new(1));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod board;
mod contracts;
mod elimination;
mod game;
mod geometry;
mod ids;
mod invariants;
mod shapes;

// Crate-level exports - Geometry
pub use geometry::{
    BOARD_HEIGHT, BOARD_SIZE, BOARD_WIDTH, CORNERS, Coord, EDGES, MAX_SHAPE_EXTENT,
};

// Crate-level exports - Identifiers
pub use ids::{IdError, NUM_PLAYERS, NUM_SHAPES, PlayerId, PlayerMask, ShapeId};

// Crate-level exports - Shapes
pub use shapes::{
    NUM_ORIENTATIONS, Orientation, OrientationMask, Shape, available_orientations, catalog_shape,
    next_orientation, prev_orientation, shape,
};

// Crate-level exports - Board and actions
pub use action::{MoveError, Placement};
pub use board::{Board, Grid, UsageTable};
pub use elimination::CellStatus;

// Crate-level exports - Turn engine
pub use game::{GameState, Outcome, Phase, TurnReport};

// Crate-level exports - Verification
pub use contracts::{Contract, GameRunning, LegalPlacement, PlacementContract, PlayersTurn};
pub use invariants::{
    ActivePlayerInvariant, GameInvariants, GameOverInvariant, Invariant, InvariantSet,
    InvariantViolation, OpeningRoundInvariant, UsageConsistentInvariant,
};
