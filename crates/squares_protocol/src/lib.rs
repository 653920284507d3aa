//! Wire protocol between squares clients and the game server.
//!
//! Every frame is a little-endian `u16` message tag, a little-endian `u16`
//! payload length and that many bytes of JSON.
//!
//! ```text
//! +--------+--------+----------------------+
//! | tag:2  | len:2  | JSON payload (len)   |
//! +--------+--------+----------------------+
//! ```
//!
//! The payload set is closed: [`Message`] has one variant per tag and is
//! decoded once at the frame boundary.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod error;
mod frame;
mod message;
mod notice;
mod snapshot;

// Crate-level exports - Errors
pub use error::{ProtocolError, SnapshotError};

// Crate-level exports - Framing
pub use frame::{HEADER_LEN, MAX_PAYLOAD, decode, encode, read_message, write_message};

// Crate-level exports - Messages
pub use message::{
    ClientId, ConnectRequest, ConnectResponse, Message, MessageTag, MoveRequest, MoveResponse,
    OpponentMove, ServerNotice,
};
pub use notice::NoticeCode;

// Crate-level exports - Snapshots
pub use snapshot::{GameSnapshot, active_player_from_wire, active_player_to_wire};
