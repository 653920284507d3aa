//! Per-connection reader and writer tasks.

use crate::session::ConnectionId;
use squares_protocol::{Message, read_message, write_message};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, instrument, warn};

/// Events fed to the arbiter's single queue.
#[derive(Debug)]
pub enum InboundEvent {
    /// A new connection is ready; its reader starts after this is queued.
    Joined {
        /// Connection handle.
        conn: ConnectionId,
        /// Outbox and reader control for the connection.
        peer: PeerHandle,
    },
    /// A decoded frame.
    Message {
        /// Sender.
        conn: ConnectionId,
        /// Frame.
        message: Message,
    },
    /// The reader hit end of stream or a decode error.
    Disconnected {
        /// Connection that ended.
        conn: ConnectionId,
    },
}

/// Items for a peer's writer task.
#[derive(Debug)]
pub enum Outbound {
    /// Write a frame.
    Message(Message),
    /// Shut the socket down.
    Close,
}

/// The arbiter's view of one connection.
#[derive(Debug)]
pub struct PeerHandle {
    /// Bounded queue drained by the writer task.
    pub outbox: mpsc::Sender<Outbound>,
    /// Cancels the reader.
    pub reader: AbortHandle,
    /// Remote address, for logs.
    pub addr: SocketAddr,
}

impl PeerHandle {
    /// Stops reading and asks the writer to flush and shut down.
    pub fn close(self) {
        self.reader.abort();
        // A full outbox drops the sender instead, which also ends the writer
        let _ = self.outbox.try_send(Outbound::Close);
    }
}

/// Decodes frames and forwards them until the stream ends.
///
/// Waits for `start` so the arbiter learns about the connection before its
/// first message.
#[instrument(skip_all, fields(conn = %conn))]
pub async fn read_loop<R>(
    conn: ConnectionId,
    reader: R,
    inbound: mpsc::Sender<InboundEvent>,
    start: oneshot::Receiver<()>,
) where
    R: AsyncRead + Unpin,
{
    if start.await.is_err() {
        return;
    }
    let mut reader = BufReader::new(reader);
    loop {
        match read_message(&mut reader).await {
            Ok(Some(message)) => {
                // Blocks while the queue is full, throttling this peer
                if inbound.send(InboundEvent::Message { conn, message }).await.is_err() {
                    return;
                }
            }
            Ok(None) => {
                debug!("Peer closed the stream");
                break;
            }
            Err(e) if e.is_malformed() => {
                warn!(error = %e, "Dropping peer after malformed frame");
                break;
            }
            Err(e) => {
                debug!(error = %e, "Read failed");
                break;
            }
        }
    }
    let _ = inbound.send(InboundEvent::Disconnected { conn }).await;
}

/// Writes queued frames until told to close or the queue is dropped.
#[instrument(skip_all, fields(conn = %conn))]
pub async fn write_loop<W>(
    conn: ConnectionId,
    mut writer: W,
    mut outbox: mpsc::Receiver<Outbound>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(item) = outbox.recv().await {
        match item {
            Outbound::Message(message) => {
                if let Err(e) = write_message(&mut writer, &message).await {
                    warn!(error = %e, "Write failed");
                    break;
                }
            }
            Outbound::Close => break,
        }
    }
    if let Err(e) = writer.shutdown().await {
        debug!(error = %e, "Shutdown after close failed");
    }
    debug!("Writer stopped");
}
