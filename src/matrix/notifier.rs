//! Alert delivery to a fixed Matrix room.

use std::sync::Arc;

use crate::{
    matrix::MatrixClient,
    monitor::{Notifier, NotifyError},
};

/// [`Notifier`] posting every alert in the same room.
pub struct RoomNotifier {
    /// Client shared with the command handler
    client: Arc<MatrixClient>,
    /// Destination room
    room_id: String,
}

impl RoomNotifier {
    /// Creates a notifier posting in `room_id`.
    ///
    /// # Arguments
    ///
    /// * `client` - Logged-in Matrix client, shared with the command handler
    /// * `room_id` - Matrix room ID receiving the alerts
    pub fn new(client: Arc<MatrixClient>, room_id: &str) -> Self {
        RoomNotifier {
            client,
            room_id: room_id.to_owned(),
        }
    }
}

impl Notifier for RoomNotifier {
    async fn send_alert(&self, body: &str) -> Result<(), NotifyError> {
        self.client.send_message(&self.room_id, body).await
    }
}
