//! Validated identifiers for players and shapes.

use crate::geometry::{BOARD_HEIGHT, BOARD_WIDTH, Coord};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Number of seats in a match.
pub const NUM_PLAYERS: usize = 4;

/// Number of distinct pieces each player owns.
pub const NUM_SHAPES: usize = 21;

/// An identifier outside its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum IdError {
    /// Player ids are 0..4.
    #[display("Player id {} is out of range", _0)]
    Player(#[error(not(source))] u8),
    /// Shape ids are 0..21.
    #[display("Shape id {} is out of range", _0)]
    Shape(#[error(not(source))] u8),
}

/// A seat at the table, 0 through 3.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(try_from = "u8", into = "u8")]
#[display("P{}", _0)]
pub struct PlayerId(u8);

impl PlayerId {
    /// All four players in turn order.
    pub const ALL: [PlayerId; NUM_PLAYERS] =
        [PlayerId(0), PlayerId(1), PlayerId(2), PlayerId(3)];

    /// Returns the player with the given index, if it is in range.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_PLAYERS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Zero-based index of this player.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The player seated after this one.
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % NUM_PLAYERS as u8)
    }

    /// The board corner this player's opening piece must cover.
    pub const fn start_corner(self) -> Coord {
        match self.0 {
            0 => Coord::new(0, 0),
            1 => Coord::new(BOARD_WIDTH - 1, 0),
            2 => Coord::new(BOARD_WIDTH - 1, BOARD_HEIGHT - 1),
            _ => Coord::new(0, BOARD_HEIGHT - 1),
        }
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = IdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(IdError::Player(value))
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> u8 {
        id.0
    }
}

/// One of the 21 catalog pieces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(try_from = "u8", into = "u8")]
#[display("#{}", _0)]
pub struct ShapeId(u8);

impl ShapeId {
    /// Returns the shape with the given index, if it is in range.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_SHAPES {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Zero-based index into the catalog.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates every shape id in catalog order.
    pub fn all() -> impl Iterator<Item = ShapeId> {
        (0..NUM_SHAPES as u8).map(ShapeId)
    }
}

impl TryFrom<u8> for ShapeId {
    type Error = IdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(IdError::Shape(value))
    }
}

impl From<ShapeId> for u8 {
    fn from(id: ShapeId) -> u8 {
        id.0
    }
}

/// A set of players, stored as a 4-bit mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PlayerMask(u8);

impl PlayerMask {
    /// The empty set.
    pub const EMPTY: PlayerMask = PlayerMask(0);

    /// Every player.
    pub const FULL: PlayerMask = PlayerMask(0b1111);

    /// Raw bits, player `i` at bit `i`.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if the player is a member.
    pub const fn contains(self, player: PlayerId) -> bool {
        self.0 & (1 << player.0) != 0
    }

    /// Adds a player.
    pub fn insert(&mut self, player: PlayerId) {
        self.0 |= 1 << player.0;
    }

    /// Number of members.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true if no player is a member.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if all four players are members.
    pub const fn is_full(self) -> bool {
        self.0 == Self::FULL.0
    }

    /// Members that are in `self` but not in `other`.
    pub const fn difference(self, other: PlayerMask) -> PlayerMask {
        PlayerMask(self.0 & !other.0)
    }

    /// Iterates members in seat order.
    pub fn iter(self) -> impl Iterator<Item = PlayerId> {
        PlayerId::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

impl FromIterator<PlayerId> for PlayerMask {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        let mut mask = PlayerMask::EMPTY;
        for player in iter {
            mask.insert(player);
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_range() {
        assert!(PlayerId::new(3).is_some());
        assert!(PlayerId::new(4).is_none());
        assert_eq!(PlayerId::try_from(9), Err(IdError::Player(9)));
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(PlayerId::ALL[3].next(), PlayerId::ALL[0]);
        assert_eq!(PlayerId::ALL[1].next(), PlayerId::ALL[2]);
    }

    #[test]
    fn test_start_corners() {
        let corners: Vec<_> = PlayerId::ALL.iter().map(|p| p.start_corner()).collect();
        assert_eq!(
            corners,
            vec![
                Coord::new(0, 0),
                Coord::new(20, 0),
                Coord::new(20, 20),
                Coord::new(0, 20)
            ]
        );
    }

    #[test]
    fn test_mask_ops() {
        let mut mask = PlayerMask::EMPTY;
        mask.insert(PlayerId::ALL[1]);
        mask.insert(PlayerId::ALL[3]);
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(PlayerId::ALL[3]));
        assert!(!mask.contains(PlayerId::ALL[0]));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![PlayerId::ALL[1], PlayerId::ALL[3]]);
        assert_eq!(PlayerMask::FULL.difference(mask).len(), 2);
        assert!(PlayerId::ALL.into_iter().collect::<PlayerMask>().is_full());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<ShapeId>("20").is_ok());
        assert!(serde_json::from_str::<ShapeId>("21").is_err());
        assert!(serde_json::from_str::<PlayerId>("4").is_err());
    }
}
