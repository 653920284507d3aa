//! TCP accept loop wiring peers to the arbiter.

use crate::arbiter::Arbiter;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::peer::{InboundEvent, PeerHandle, read_loop, write_loop};
use crate::session::{ConnectionId, Session};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, instrument};

/// Binds the configured address and serves until accepting fails.
#[instrument(skip(config), fields(bind = %config.bind()))]
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind())
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind().clone(),
            source,
        })?;
    serve_listener(listener, config).await
}

/// Serves on an already bound listener.
#[instrument(skip_all)]
pub async fn serve_listener(
    listener: TcpListener,
    config: ServerConfig,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Listening");
    }
    let (inbound, queue) = mpsc::channel(*config.queue_capacity());
    let arbiter = Arbiter::new(Session::new(*config.seed()), queue);
    tokio::spawn(arbiter.run());

    let mut next_conn = 0u64;
    loop {
        let (stream, addr) = listener.accept().await.map_err(ServerError::Accept)?;
        next_conn += 1;
        let conn = ConnectionId(next_conn);
        spawn_peer(conn, stream, addr, &inbound, *config.outbox_capacity()).await?;
    }
}

async fn spawn_peer(
    conn: ConnectionId,
    stream: TcpStream,
    addr: SocketAddr,
    inbound: &mpsc::Sender<InboundEvent>,
    outbox_capacity: usize,
) -> Result<(), ServerError> {
    let _ = stream.set_nodelay(true);
    let (read_half, write_half) = stream.into_split();
    let (outbox, outbox_rx) = mpsc::channel(outbox_capacity);
    let (start, started) = oneshot::channel();

    tokio::spawn(write_loop(conn, write_half, outbox_rx));
    let reader = tokio::spawn(read_loop(conn, read_half, inbound.clone(), started)).abort_handle();

    let peer = PeerHandle {
        outbox,
        reader,
        addr,
    };
    inbound
        .send(InboundEvent::Joined { conn, peer })
        .await
        .map_err(|_| ServerError::ArbiterStopped)?;
    let _ = start.send(());
    Ok(())
}
