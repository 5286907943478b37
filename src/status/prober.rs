//! Player count probing.
//!
//! This module provides the [`StatusProber`] which turns a status request into a
//! player count. It never fails: every error path degrades to `0` so that an
//! unreachable status service is never mistaken for a full server.

use log::{error, info, warn};
use mockall::automock;

use crate::status::requester::Requester;

/// Something able to tell how many players are connected right now.
#[automock]
pub trait Probe {
    /// Returns the number of connected players, `0` when unknown.
    async fn probe(&self) -> u32;
}

/// Probes a single server through a [Requester].
///
/// # Examples
///
/// ```no_run
/// let requester = StatusRequester::new("https://api.mcsrvstat.us", Duration::from_secs(10))?;
/// let prober = StatusProber::new(requester, "play.example.com");
/// let count = prober.probe().await;
/// ```
pub struct StatusProber<R: Requester> {
    /// Requester used to reach the status service
    requester: R,
    /// Address of the monitored server
    server_address: String,
}

impl<R: Requester> StatusProber<R> {
    /// Create a new [StatusProber].
    ///
    /// # Arguments
    ///
    /// * `requester` - An implementation of the [Requester] trait.
    /// * `server_address` - Address of the game server, as understood by the status service.
    pub fn new(requester: R, server_address: &str) -> Self {
        StatusProber {
            requester,
            server_address: server_address.to_owned(),
        }
    }
}

impl<R: Requester> Probe for StatusProber<R> {
    /// Requests the server status and extracts the online player count.
    ///
    /// Returns `0` when the server is offline, when the service omits the
    /// player counters, and when the request fails for any reason.
    async fn probe(&self) -> u32 {
        info!("probing server {}", self.server_address);

        let status = match self.requester.get_status(&self.server_address).await {
            Ok(status) => status,
            Err(e) => {
                error!("error while probing {}: {}", self.server_address, e);
                return 0;
            }
        };

        if !status.online {
            warn!("server {} is offline", self.server_address);
            return 0;
        }

        match status.players {
            Some(players) => {
                info!(
                    "server {} is online with {} players",
                    self.server_address, players.online
                );
                players.online
            }
            None => {
                error!(
                    "server {} is online but reported no player count",
                    self.server_address
                );
                0
            }
        }
    }
}
