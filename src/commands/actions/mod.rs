//! Command action handlers.
//!
//! Each handler receives a [`CommandContext`](crate::commands::CommandContext),
//! processes the command and returns a [`CommandResult`](crate::commands::CommandResult).
//! Handlers never fail: errors are turned into a user-facing reply.
//!
//! # Available Handlers
//!
//! - [`handle_players`] - Report the number of players online

mod players;

pub use crate::commands::actions::players::handle_players;
