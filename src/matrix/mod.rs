//! Matrix protocol integration for the bot.
//!
//! This module is the chat transport:
//! - Login, session persistence and restoration
//! - Real-time event synchronization, auto-join on invite
//! - Sending alerts and replies
//!
//! # Architecture
//!
//! The module is structured around the [`MatrixClient`] which coordinates:
//! - **Login**: password login or session restoration via the login submodule
//! - **Session**: on-disk login and sync token via the session submodule
//! - **Sync**: event handling via the sync submodule
//!
//! [`RoomNotifier`] plugs the client into the monitor as its alert destination.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use tally::matrix::{MatrixClient, UserCredentials};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = UserCredentials {
//!     user_id: "@bot:example.com".to_string(),
//!     password: "password".to_string(),
//! };
//!
//! let client = MatrixClient::new(&credentials, Path::new("./data/session")).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod login;
mod notifier;
mod session;
mod sync;

pub use crate::matrix::client::MatrixClient;
pub use crate::matrix::notifier::RoomNotifier;
pub use crate::matrix::sync::IncomingMessage;

/// User credentials for a Matrix account
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID of the matrix account
    pub user_id: String,
    /// Password of the matrix account
    pub password: String,
}
