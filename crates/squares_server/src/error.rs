//! Server-side error type.

use crate::config::ConfigError;
use derive_more::{Display, Error, From};
use squares_game::{MoveError, Placement};
use squares_protocol::{MessageTag, NoticeCode, ProtocolError, SnapshotError};

/// Failures of the listener, the peer plumbing or the client.
#[derive(Debug, Display, Error, From)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[display("Failed to bind {}: {}", addr, source)]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// Accepting a connection failed.
    #[display("Accept failed: {}", _0)]
    Accept(std::io::Error),

    /// The arbitration task is gone.
    #[display("Arbiter stopped")]
    ArbiterStopped,

    /// Bad configuration.
    #[display("{}", _0)]
    #[from]
    Config(ConfigError),

    /// A frame could not be read or written.
    #[display("{}", _0)]
    #[from]
    Protocol(ProtocolError),

    /// The server sent an unusable snapshot.
    #[display("Bad snapshot: {}", _0)]
    #[from]
    Snapshot(SnapshotError),

    /// The server refused the connection.
    #[display("Rejected by server: {}", _0)]
    Rejected(#[error(not(source))] NoticeCode),

    /// The peer sent a message its role never sends.
    #[display("Unexpected {} message", _0)]
    UnexpectedMessage(#[error(not(source))] MessageTag),

    /// The stream ended before the handshake finished.
    #[display("Connection closed during handshake")]
    HandshakeClosed,

    /// The local mirror refused a move before it was sent.
    #[display("Move refused locally: {}", _0)]
    #[from]
    Move(MoveError),

    /// The server broadcast a placement that does not fit the board.
    #[display("Broadcast placement {} is off the board", _0)]
    OffBoard(#[error(not(source))] Placement),
}
