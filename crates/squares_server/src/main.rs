//! Squares - unified CLI.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use squares_protocol::{ClientId, NoticeCode};
use squares_server::{
    Cli, Client, ClientEvent, Command, ServerConfig, ServerError, run_local, serve,
};
use std::time::Duration;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,squares_server=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind, config } => run_server(bind, config).await,
        Command::Local => run_local_game(),
        Command::Client { addr, id, retries } => {
            run_client(addr, id.map(ClientId::new), retries).await
        }
    }
}

/// Run the game server
#[instrument]
async fn run_server(bind: Option<String>, config: Option<std::path::PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => ServerConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    let mut config = config.with_env()?;
    if let Some(bind) = bind {
        config = config.with_bind(bind);
    }
    info!(bind = %config.bind(), "Starting squares server");
    serve(config).await?;
    Ok(())
}

/// Play locally on stdin/stdout
fn run_local_game() -> Result<()> {
    let stdin = std::io::stdin();
    let game = run_local(stdin.lock(), std::io::stdout())?;
    info!(phase = %game.phase(), "Local game finished");
    Ok(())
}

/// Pause between redial attempts
const REDIAL_DELAY: Duration = Duration::from_millis(500);

/// Observe a server as a headless client
#[instrument]
async fn run_client(addr: String, id: Option<ClientId>, retries: u32) -> Result<()> {
    let mut client = Client::connect(addr.as_str(), id).await?;
    let (seat, id) = client.seat();
    info!(seat = %seat, client = %id, "Connected; reconnect with --id {}", id);
    loop {
        let event = match client.next_event().await {
            Ok(event) => event,
            Err(ServerError::Protocol(e)) => {
                warn!(error = %e, "Stream dropped");
                redial(&mut client, &addr, retries).await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        match event {
            ClientEvent::Closed => {
                warn!("Server closed the connection");
                redial(&mut client, &addr, retries).await?;
            }
            ClientEvent::Notice(NoticeCode::SessionReplaced) => {
                warn!("Seat taken over by a newer connection");
                return Ok(());
            }
            ClientEvent::Snapshot => {
                info!(
                    active = ?client.state().active_player(),
                    my_turn = client.my_turn(),
                    "Snapshot received"
                );
            }
            ClientEvent::OpponentMove(m) => {
                info!(
                    player = %m.player_id,
                    shape = %m.shape,
                    next = ?m.active_player,
                    my_turn = client.my_turn(),
                    "Move on the board"
                );
                if m.active_player.is_none() {
                    info!("Game over\n{}", client.state().board().display());
                    return Ok(());
                }
            }
            event => info!(?event, "Server event"),
        }
    }
}

/// Dial again with the same identity, giving up after `retries` failures
async fn redial(client: &mut Client, addr: &str, retries: u32) -> Result<()> {
    let mut attempt = 0;
    loop {
        tokio::time::sleep(REDIAL_DELAY).await;
        match client.reconnect(addr).await {
            Ok(()) => return Ok(()),
            Err(e @ ServerError::Rejected(_)) => return Err(e.into()),
            Err(e) if attempt >= retries => {
                return Err(e).context(format!("giving up after {attempt} redials"));
            }
            Err(e) => {
                attempt += 1;
                warn!(attempt, error = %e, "Redial failed");
            }
        }
    }
}
