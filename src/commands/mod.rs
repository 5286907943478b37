//! Bot command parsing and response formatting.
//!
//! This module answers on-demand queries sent in Matrix rooms and formats the
//! messages the bot posts.
//!
//! # Architecture
//!
//! ```text
//! Matrix Message
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← parse() + parse_command()
//! └─────────────┘
//!      │
//!      ├── parse() ──────────► command::Command
//!      │
//!      └── parse_command() ──► actions::handle_players ──► CommandResult
//! ```
//!
//! # Available Commands
//!
//! | Command | Arguments | Description |
//! |---------|-----------|-------------|
//! | `!players` | None | Show the server address and the number of players online |
//!
//! Messages that are not one of these commands are ignored silently.
//!
//! # Module Organization
//!
//! - [`commander`] - Main orchestrator for parsing and executing commands
//! - [`command`] - Command enum definitions and parsing logic
//! - [`actions`] - Individual command handler implementations
//! - [`markdown_response`] - Response and alert formatting

mod actions;
mod command;
mod commander;
mod markdown_response;

pub use crate::commands::commander::Commander;
use crate::status::Probe;

/// Runtime context for command execution.
///
/// # Fields
///
/// * `prober` - Player count source, shared with the monitor
/// * `server_address` - Address of the monitored server
/// * `room_id` - Matrix room ID where the command was issued
/// * `user_id` - Matrix user ID of the user who issued the command
pub struct CommandContext<'a, P: Probe> {
    /// Player count source
    pub prober: &'a P,
    /// Address of the monitored server
    pub server_address: &'a str,
    /// Matrix room ID where the command was issued
    pub room_id: String,
    /// Matrix user ID of the command issuer
    pub user_id: String,
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Markdown-formatted response message
    pub response: String,
}

/// Errors that can occur during command parsing.
///
/// Only silent errors exist: a message that is not one of our commands never
/// gets a reply.
#[derive(Debug)]
pub enum CommandParseError {
    /// Message is not for this bot (silent error)
    NotForBot,
}
