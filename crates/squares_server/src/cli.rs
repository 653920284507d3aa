//! Command-line interface for the `squares` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Squares - four-player polyomino corner game
#[derive(Parser, Debug)]
#[command(name = "squares")]
#[command(
    about = "Authoritative server and clients for a four-player corner game",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Address to bind, overriding config and environment
        #[arg(short, long)]
        bind: Option<String>,

        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Play all four seats in this terminal
    Local,

    /// Connect as a headless client and log what the server sends
    Client {
        /// Server address
        #[arg(long, default_value = "127.0.0.1:7878")]
        addr: String,

        /// Identity to reclaim a seat with
        #[arg(long)]
        id: Option<u64>,

        /// Redial attempts after the stream drops
        #[arg(long, default_value_t = 5)]
        retries: u32,
    },
}
