//! Configuration file structures for the tally bot.
//!
//! The configuration is a YAML file split in two sections: the monitored server
//! and the Matrix account. Every value can be overridden by an environment
//! variable prefixed with `TALLY_`, nested keys being separated by `__`.
//!
//! # Configuration File Format
//!
//! ```yaml
//! status:
//!   # Base URL of the status service (optional)
//!   url: "https://api.mcsrvstat.us"
//!   # Address of the game server to monitor
//!   server_address: "play.example.com"
//!   # Minimum number of players that triggers an alert
//!   threshold: 5
//!   # Seconds between two probes (optional)
//!   polling_interval: 300
//!   # Seconds to wait after a failed cycle (optional)
//!   recovery_delay: 60
//!   # Seconds before a status request is abandoned (optional)
//!   timeout: 10
//!
//! matrix:
//!   user_id: "@tally:matrix.org"
//!   password: "secret-password"
//!   # Room receiving the alerts
//!   room_id: "!abcdef:matrix.org"
//! ```
//!
//! # Environment Variable Overrides
//!
//! ```bash
//! export TALLY_MATRIX__PASSWORD="secret-from-env"
//! export TALLY_STATUS__THRESHOLD=10
//! ```

use std::time::Duration;

use anyhow::{Context, bail};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use matrix_sdk::ruma::{OwnedRoomId, OwnedUserId};
use serde::Deserialize;

use crate::monitor::MonitorTimings;

/// Prefix of the environment variables overriding the configuration file.
const ENV_PREFIX: &str = "TALLY_";

/// Root configuration structure.
#[derive(Deserialize, Debug)]
pub struct Config {
    /// Monitored server configuration
    pub status: Status,
    /// Matrix account configuration
    pub matrix: Matrix,
}

/// Monitored server and status service configuration.
#[derive(Deserialize, Debug)]
pub struct Status {
    /// Base URL of the status service, without trailing slash.
    #[serde(default = "default_status_url")]
    pub url: String,

    /// Address of the game server, as understood by the status service.
    ///
    /// # Examples
    ///
    /// - `play.example.com`
    /// - `play.example.com:25570`
    pub server_address: String,

    /// Minimum number of players that qualifies for an alert.
    pub threshold: u32,

    /// Seconds between the end of a poll cycle and the next probe.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,

    /// Seconds to wait after a failed poll cycle.
    #[serde(default = "default_recovery_delay")]
    pub recovery_delay: u64,

    /// Seconds before a status request is abandoned.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Matrix account configuration.
#[derive(Deserialize, Debug)]
pub struct Matrix {
    /// Fully qualified Matrix user ID, `@username:homeserver.com`.
    pub user_id: String,

    /// Matrix account password.
    ///
    /// Used for the first login. The session is then persisted in the data
    /// directory and restored without re-authenticating.
    pub password: String,

    /// Room receiving the alerts, `!opaque_id:homeserver.com`.
    ///
    /// The bot must be invited to this room; it joins automatically.
    pub room_id: String,
}

fn default_status_url() -> String {
    "https://api.mcsrvstat.us".to_owned()
}

fn default_polling_interval() -> u64 {
    300
}

fn default_recovery_delay() -> u64 {
    60
}

fn default_timeout() -> u64 {
    10
}

impl Config {
    /// Loads the configuration from a YAML file, then applies `TALLY_`
    /// environment variable overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Fails when a required value is missing, when a value has the wrong
    /// type, or when [`Config::validate`] rejects it.
    pub fn load(path: &str) -> Result<Config, anyhow::Error> {
        let mut config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("invalid configuration in {}", path))?;

        // Normalize status URL by removing trailing slashes
        while config.status.url.ends_with('/') {
            config.status.url.pop();
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the bot misbehave instead of defaulting them.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.status.url.is_empty() {
            bail!("status.url must not be empty");
        }
        if self.status.server_address.trim().is_empty() {
            bail!("status.server_address must not be empty");
        }
        if self.status.threshold == 0 {
            bail!("status.threshold must be at least 1");
        }
        if self.status.polling_interval == 0 {
            bail!("status.polling_interval must be at least 1 second");
        }
        if self.status.recovery_delay == 0 {
            bail!("status.recovery_delay must be at least 1 second");
        }
        if self.status.timeout == 0 {
            bail!("status.timeout must be at least 1 second");
        }

        OwnedUserId::try_from(self.matrix.user_id.as_str())
            .with_context(|| format!("invalid matrix.user_id {}", self.matrix.user_id))?;
        OwnedRoomId::try_from(self.matrix.room_id.as_str())
            .with_context(|| format!("invalid matrix.room_id {}", self.matrix.room_id))?;

        Ok(())
    }
}

impl Status {
    /// Loop cadence of the monitor.
    pub fn timings(&self) -> MonitorTimings {
        MonitorTimings {
            poll_interval: Duration::from_secs(self.polling_interval),
            recovery_delay: Duration::from_secs(self.recovery_delay),
        }
    }

    /// Timeout of a single status request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
