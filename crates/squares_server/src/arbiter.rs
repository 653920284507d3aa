//! The single task that owns the session and every connection's outbox.

use crate::peer::{InboundEvent, Outbound, PeerHandle};
use crate::session::{ConnectionId, Dispatch, Inbound, Session};
use squares_protocol::Message;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, instrument, warn};

/// Serializes every state change through one queue consumer.
pub struct Arbiter {
    session: Session,
    peers: HashMap<ConnectionId, PeerHandle>,
    inbound: mpsc::Receiver<InboundEvent>,
}

impl Arbiter {
    /// Creates an arbiter reading from `inbound`.
    pub fn new(session: Session, inbound: mpsc::Receiver<InboundEvent>) -> Self {
        Self {
            session,
            peers: HashMap::new(),
            inbound,
        }
    }

    /// Processes events until every sender is gone.
    #[instrument(skip_all)]
    pub async fn run(mut self) {
        info!("Arbiter running");
        while let Some(event) = self.inbound.recv().await {
            self.on_event(event);
        }
        info!("Arbiter stopped");
    }

    /// Applies one event.
    pub fn on_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Joined { conn, peer } => {
                info!(conn = %conn, addr = %peer.addr, "Peer joined");
                self.peers.insert(conn, peer);
            }
            InboundEvent::Message { conn, message } => {
                // Frames already queued by a peer the server closed
                if !self.peers.contains_key(&conn) {
                    debug!(conn = %conn, "Ignoring frame from closed peer");
                    return;
                }
                let dispatches = self.session.handle(conn, Inbound::Message(message));
                self.apply(dispatches);
            }
            InboundEvent::Disconnected { conn } => {
                if let Some(peer) = self.peers.remove(&conn) {
                    info!(conn = %conn, addr = %peer.addr, "Peer left");
                    peer.close();
                    self.session.handle(conn, Inbound::Disconnected);
                }
            }
        }
    }

    fn apply(&mut self, dispatches: Vec<Dispatch>) {
        for dispatch in dispatches {
            match dispatch {
                Dispatch::Send { to, message } => self.send(to, message),
                Dispatch::Close { conn } => {
                    if let Some(peer) = self.peers.remove(&conn) {
                        debug!(conn = %conn, "Closing peer");
                        peer.close();
                    }
                }
            }
        }
    }

    fn send(&mut self, to: ConnectionId, message: Message) {
        let Some(peer) = self.peers.get(&to) else {
            return;
        };
        match peer.outbox.try_send(Outbound::Message(message)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(conn = %to, "Outbox full, dropping slow peer");
                self.drop_peer(to);
            }
            Err(TrySendError::Closed(_)) => {
                debug!(conn = %to, "Writer already gone");
                self.drop_peer(to);
            }
        }
    }

    fn drop_peer(&mut self, conn: ConnectionId) {
        if let Some(peer) = self.peers.remove(&conn) {
            peer.close();
        }
        self.session.handle(conn, Inbound::Disconnected);
    }
}
