//! Response structures for the status API.
//!
//! This module contains structures for deserializing JSON responses from
//! the `/3/{address}` endpoint of the server status service.

use serde::Deserialize;
use std::fmt;

/// Representation of a server status from `/3/{address}`.
///
/// Only the fields the bot needs are kept, everything else in the payload
/// is ignored. When the server is offline the service omits `players`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StatusResponse {
    /// Whether the service managed to reach the game server.
    pub online: bool,
    /// Player counters, only present when the server is online.
    pub players: Option<Players>,
}

impl fmt::Display for StatusResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.players {
            Some(players) => write!(f, "online={}, players={}", self.online, players),
            None => write!(f, "online={}", self.online),
        }
    }
}

/// Player counters of an online server.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Players {
    /// Number of players currently connected.
    pub online: u32,
    /// Maximum number of slots, when the server advertises it.
    pub max: Option<u32>,
}

impl fmt::Display for Players {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}/{}", self.online, max),
            None => write!(f, "{}", self.online),
        }
    }
}
