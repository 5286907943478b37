//! Player count monitoring and alerting.
//!
//! This module contains the only decision-making part of the bot:
//!
//! - [`MonitorState`](state::MonitorState): remembers the last alerted count
//! - [`AlertMonitor`]: polls the player count and sends alerts
//! - [`Notifier`]: where alerts go, implemented by the Matrix transport
//!
//! # Transition rule
//!
//! Evaluated once per poll cycle, with `last` the last alerted count:
//!
//! ```text
//! count >= threshold && count != last  →  alert, last = count
//! count <  threshold                   →  last = 0 (armed)
//! otherwise                            →  nothing, already alerted
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use tally::monitor::{AlertMonitor, MonitorTimings};
//!
//! # async fn example() {
//! let monitor = AlertMonitor::new(prober, notifier, 5, "play.example.com", MonitorTimings::default());
//! let cancel = CancellationToken::new();
//! let handle = tokio::spawn(monitor.run(cancel.clone()));
//! cancel.cancel();
//! handle.await.unwrap();
//! # }
//! ```

use std::fmt;

use mockall::automock;

mod alert_monitor;
mod state;

pub use crate::monitor::alert_monitor::{AlertMonitor, MonitorTimings};

/// Destination of the alerts.
#[automock]
pub trait Notifier {
    /// Delivers an alert message to the destination room.
    async fn send_alert(&self, body: &str) -> Result<(), NotifyError>;
}

/// Errors a [`Notifier`] can report.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyError {
    /// The transport does not know the destination room, usually because the
    /// bot has not joined it yet. Handled like any other delivery failure.
    RoomUnavailable(String),
    /// The room is known but sending the message failed.
    Delivery(String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotifyError::RoomUnavailable(room_id) => write!(f, "room {} is not available", room_id),
            NotifyError::Delivery(reason) => write!(f, "delivery failed: {}", reason),
        }
    }
}
