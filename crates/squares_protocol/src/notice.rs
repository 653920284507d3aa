//! Numeric codes carried by server notices.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr};

/// Why the server sent a notice instead of a regular response.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    FromRepr,
    strum::Display,
)]
#[serde(try_from = "u16", into = "u16")]
#[repr(u16)]
pub enum NoticeCode {
    /// A reconnect named an identity this match never issued.
    UnknownClient = 1,
    /// A move arrived before the lobby filled or after the game ended.
    GameNotRunning = 2,
    /// All four seats are taken.
    LobbyFull = 3,
    /// Another connection took over this seat.
    SessionReplaced = 4,
    /// The client sent a message only the server may send.
    ProtocolViolation = 5,
}

impl NoticeCode {
    /// Wire value.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Returns true if the server closes the connection after this notice.
    pub const fn closes_connection(self) -> bool {
        !matches!(self, NoticeCode::GameNotRunning)
    }
}

impl From<NoticeCode> for u16 {
    fn from(code: NoticeCode) -> u16 {
        code.code()
    }
}

impl TryFrom<u16> for NoticeCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        NoticeCode::from_repr(value).ok_or_else(|| format!("unknown notice code {}", value))
    }
}
