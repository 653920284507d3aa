//! Error types for framing and snapshot conversion.

use derive_more::{Display, Error, From};

/// A frame could not be encoded, read or decoded.
#[derive(Debug, Display, Error, From)]
pub enum ProtocolError {
    /// The underlying stream failed.
    #[display("I/O error: {}", _0)]
    #[from]
    Io(std::io::Error),

    /// The header named a tag outside the message catalog.
    #[display("Unknown message tag {}", _0)]
    UnknownTag(#[error(not(source))] u16),

    /// The payload does not fit the 16-bit length field.
    #[display("Payload of {} bytes exceeds the frame limit", _0)]
    PayloadTooLarge(#[error(not(source))] usize),

    /// The payload was not valid JSON for its tag.
    #[display("Malformed payload: {}", _0)]
    #[from]
    Json(serde_json::Error),

    /// The stream ended inside a frame.
    #[display("Stream ended mid-frame")]
    Truncated,
}

/// A snapshot carried values a live game cannot have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SnapshotError {
    /// A board cell held something other than -1 or a seat index.
    #[display("Cell ({}, {}) has invalid owner {}", x, y, owner)]
    CellOwner {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
        /// Raw value.
        owner: i8,
    },

    /// The active player was neither -1 nor a seat index.
    #[display("Invalid active player {}", _0)]
    ActivePlayer(#[error(not(source))] i8),
}

impl ProtocolError {
    /// Returns true for errors caused by the peer's bytes rather than the
    /// transport.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ProtocolError::Io(_))
    }
}
