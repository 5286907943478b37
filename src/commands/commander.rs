//! Command orchestration and execution.
//!
//! This module provides the [`Commander`] struct, the entry point for
//! processing bot commands.
//!
//! # Flow
//!
//! ```text
//! Matrix Message → parse() → Command → parse_command() → CommandResult
//! ```

use command_parser::Parser;
use log::debug;

use crate::{
    commands::{
        CommandContext, CommandParseError, CommandResult,
        actions::handle_players,
        command::{Command, CommandParsingError},
        markdown_response::format_alert,
    },
    status::Probe,
};

/// Command orchestrator for parsing and executing bot commands.
///
/// Commands start with `!`; messages without this prefix, and unknown
/// commands, are silently ignored (returning [`CommandParseError::NotForBot`]).
pub struct Commander {
    /// Command parser for processing user commands
    parser: Parser,
}

impl Default for Commander {
    fn default() -> Self {
        Self::new()
    }
}

impl Commander {
    /// Creates a new Commander instance with a configured command parser.
    ///
    /// The parser recognizes `!` as the command prefix and `-` as the option prefix.
    pub fn new() -> Self {
        let parser = Parser::new('!', '-');
        Commander { parser }
    }

    /// Parses a Matrix message body into a structured command.
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Successfully parsed command
    /// * `Err(CommandParseError::NotForBot)` - Message is not a command or not one of ours
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        match Command::parse(&self.parser, body) {
            Ok(command) => Ok(command),
            Err(CommandParsingError::UnableToParse) => Err(CommandParseError::NotForBot),
            Err(CommandParsingError::Unknown) => {
                debug!("ignoring unknown command {}", body);
                Err(CommandParseError::NotForBot)
            }
        }
    }

    /// Executes a parsed command and returns the result.
    ///
    /// # Command Handlers
    ///
    /// - [`Command::Players`] → [`handle_players`]
    pub async fn parse_command<P: Probe>(
        &self,
        command: &Command,
        context: &CommandContext<'_, P>,
    ) -> CommandResult {
        match command {
            Command::Players => handle_players(context).await,
        }
    }

    /// Generates the alert posted in the destination room.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of players online
    /// * `server_address` - Address of the monitored server
    pub fn get_alert_message(count: u32, server_address: &str) -> String {
        format_alert(count, server_address)
    }
}
