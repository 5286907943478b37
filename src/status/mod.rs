//! Game server status integration.
//!
//! This module asks a public status service (mcsrvstat.us API v3 style) how many
//! players are connected to the monitored server.
//!
//! # Modules
//!
//! - `requester` - HTTP client for the status service
//! - `response_structs` - Data structures for the API responses
//! - `prober` - Fail-safe conversion of a status response into a player count
//!
//! # Examples
//!
//! ```no_run
//! use tally::status::{Probe, StatusProber, StatusRequester};
//!
//! let requester = StatusRequester::new("https://api.mcsrvstat.us", Duration::from_secs(10))?;
//! let prober = StatusProber::new(requester, "play.example.com");
//! let players = prober.probe().await;
//! ```

mod prober;
mod requester;
mod response_structs;

#[cfg(test)]
pub use crate::status::prober::MockProbe;
pub use crate::status::prober::{Probe, StatusProber};
pub use crate::status::requester::StatusRequester;
