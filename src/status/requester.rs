//! HTTP client for the server status API.
//!
//! This module provides the [`StatusRequester`] struct for querying the status
//! service about a game server.

use std::time::Duration;

use log::{debug, info};
use mockall::automock;
use reqwest::{Client, Error};

use crate::status::response_structs::StatusResponse;

/// HTTP client for requesting data from the status service.
///
/// # Examples
///
/// ```no_run
/// let requester = StatusRequester::new("https://api.mcsrvstat.us", Duration::from_secs(10))?;
/// let status = requester.get_status("play.example.com").await?;
/// println!("Status: {}", status);
/// ```
pub struct StatusRequester {
    /// Base url of the status service, without trailing slash
    url: String,
    /// HTTP client, configured with the request timeout
    client: Client,
}

/// Trait for making requests to the status service.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait Requester {
    /// Fetches the status of the server at `address`.
    async fn get_status(&self, address: &str) -> Result<StatusResponse, Error>;
}

impl StatusRequester {
    /// Create a new [StatusRequester].
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL of the status service.
    /// * `timeout` - Upper bound for a whole request, connection included.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built (TLS backend initialisation).
    pub fn new(url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(StatusRequester {
            url: url.to_string(),
            client,
        })
    }
}

impl Requester for StatusRequester {
    /// Request `/3/{address}` to get the status of a server.
    ///
    /// This api call returns a json object, trimmed here to the fields we read:
    /// ```text
    /// { "online": true, "players": { "online": 7, "max": 20 } }
    /// ```
    /// A non-success HTTP status is turned into an error.
    async fn get_status(&self, address: &str) -> Result<StatusResponse, Error> {
        let url = format!("{}/3/{}", &self.url, address);
        info!("request status of {}", address);
        debug!("request {}", &url);

        let status: StatusResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("response from {} -> {}", &url, &status);

        Ok(status)
    }
}
