//! Server, headless client and local mode for the squares game.
//!
//! # Architecture
//!
//! - **Session**: synchronous lobby and match state machine
//! - **Arbiter**: the one task that owns the session and all outboxes
//! - **Peers**: a reader and a writer task per connection
//! - **Listener**: TCP accept loop
//! - **Client**: network client that mirrors the server by replaying
//!   broadcasts
//! - **Local**: the same rules with no network
//!
//! Readers forward decoded frames into a single bounded queue. Only the
//! arbiter mutates the game, so no state is shared between tasks.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod arbiter;
mod cli;
mod client;
mod config;
mod error;
mod listener;
mod local;
mod peer;
mod session;

// Crate-level exports - Configuration
pub use cli::{Cli, Command};
pub use config::{ConfigError, ENV_BIND, ENV_QUEUE_CAPACITY, ServerConfig};

// Crate-level exports - Errors
pub use error::ServerError;

// Crate-level exports - Session state machine
pub use session::{ConnectionId, Dispatch, Inbound, Seat, Session, SessionPhase, SlotTable};

// Crate-level exports - Async plumbing
pub use arbiter::Arbiter;
pub use listener::{serve, serve_listener};
pub use peer::{InboundEvent, Outbound, PeerHandle, read_loop, write_loop};

// Crate-level exports - Clients
pub use client::{Client, ClientEvent};
pub use local::{Command as LocalCommand, run_local};
