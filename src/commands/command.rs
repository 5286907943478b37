//! Command parsing.
//!
//! This module converts Matrix message text into a structured [`Command`].

use command_parser::Parser;
use log::debug;

/// Represents a parsed bot command.
#[derive(Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Report the number of players online, `!players`
    Players,
}

/// Errors that can occur during command parsing.
#[derive(Debug)]
pub enum CommandParsingError {
    /// The message could not be parsed as a command
    UnableToParse,
    /// The message is a command, but not one of ours
    Unknown,
}

impl Command {
    /// Parses a message string into a Command.
    ///
    /// Arguments after the command name are ignored.
    ///
    /// # Arguments
    ///
    /// * `parser` - The command parser instance configured for the bot
    /// * `body` - The message text to parse
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The message is not a command format - [`CommandParsingError::UnableToParse`]
    /// - The command is not recognized - [`CommandParsingError::Unknown`]
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        // The parser drops the last word, pad the body so nothing meaningful is lost
        let body = body.trim().to_string() + " dummy";

        let command = match parser.parse(&body) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParsingError::UnableToParse),
        };

        debug!("parsing command: {:?}", command);

        match command.name.as_str() {
            "players" => Ok(Command::Players),
            _ => Err(CommandParsingError::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_parser() -> Parser {
        Parser::new('!', '-')
    }

    #[test]
    fn test_parse_players_command() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!players");
        assert!(matches!(result, Ok(Command::Players)));
    }

    #[test]
    fn test_parse_players_command_with_surrounding_spaces() {
        let parser = create_parser();
        let result = Command::parse(&parser, "  !players  ");
        assert!(matches!(result, Ok(Command::Players)));
    }

    #[test]
    fn test_parse_players_command_ignores_arguments() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!players now please");
        assert!(matches!(result, Ok(Command::Players)));
    }

    #[test]
    fn test_parse_unknown_command() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!weather");
        assert!(matches!(result, Err(CommandParsingError::Unknown)));
    }

    #[test]
    fn test_parse_unable_to_parse() {
        let parser = create_parser();
        let result = Command::parse(&parser, "how many players are online?");
        assert!(matches!(result, Err(CommandParsingError::UnableToParse)));
    }
}
