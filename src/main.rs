//! Tally - A Matrix bot alerting a room when a game server gets busy.
//!
//! # Overview
//!
//! Tally watches the player count of a Minecraft-style server through a public
//! status API. When enough players are online it posts an alert in a Matrix
//! room, and anyone can ask for the current count with a command.
//!
//! # Features
//!
//! - **Player Alerts**: Posts an alert when the count reaches the threshold,
//!   again whenever it changes while staying above, and rearms once it drops below
//! - **On-Demand Count**: `!players` replies with the server address and player count
//! - **Fail-Safe Probing**: An unreachable server, an API error or a timeout all count as 0 players
//! - **Session Persistence**: Maintains Matrix login sessions across restarts
//! - **YAML Configuration**: Simple configuration file format with environment variable support
//! - **Graceful Shutdown**: Ctrl-C stops the monitor before the Matrix client goes away
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! status:
//!   server_address: "play.example.com"
//!   threshold: 5
//!
//! matrix:
//!   user_id: "@tally:matrix.org"
//!   password: "your-password"
//!   room_id: "!abcdef:matrix.org"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `TALLY_` prefix:
//!
//! ```bash
//! export TALLY_STATUS__SERVER_ADDRESS="play.example.com"
//! export TALLY_STATUS__THRESHOLD=5
//! export TALLY_MATRIX__PASSWORD="your-password"
//! ```
//!
//! # Usage
//!
//! ```bash
//! tally --config config.yaml --data ./tally-data
//! ```
//!
//! # Bot Commands
//!
//! - `!players` - Show the server address and the number of players online
//!
//! # Architecture
//!
//! - [`bot`] - Wires the monitor task and the Matrix command handler together
//! - [`commands`] - Command parsing, execution and message formatting
//! - [`config`] - YAML configuration loading and validation
//! - [`matrix`] - Matrix client integration and session management
//! - [`monitor`] - Alert state machine and polling loop
//! - [`status`] - Status API client and fail-safe player count probe
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::{bot::Bot, config::Config};

mod bot;
mod commands;
mod config;
mod matrix;
mod monitor;
mod status;

/// Command-line arguments for the Tally bot.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// See the [`config`] module for the expected format.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// Holds `session/`, the Matrix login and sync token. Anyone reading it can
    /// impersonate the bot, keep it private:
    ///
    /// ```bash
    /// mkdir -p ./tally-data
    /// chmod 700 ./tally-data
    /// ```
    #[arg(short, long)]
    data: String,
}

/// Main entry point for the Tally bot.
///
/// 1. Configures the logger with `info` level by default
/// 2. Parses command-line arguments
/// 3. Loads and validates the configuration, exiting with an error status if it is invalid
/// 4. Logs in to Matrix
/// 5. Runs the bot until Ctrl-C
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting tally {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {:#}", e);
            std::process::exit(1);
        }
    };

    let bot = match Bot::new(config, args).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to initialize bot: {:#}", e);
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("received Ctrl-C");
        signal_token.cancel();
    });

    bot.start(shutdown).await;
}
