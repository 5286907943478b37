//! Matrix client wrapper for bot messaging and synchronization.
//!
//! This module provides a high-level [`MatrixClient`] interface that wraps the
//! Matrix SDK client and handles message sending and synchronization.

use std::path::Path;

use log::{error, info, warn};
use matrix_sdk::{
    Client, RoomState,
    ruma::{
        EventId, RoomId, UserId,
        events::room::message::{
            AddMentions, ForwardThread, ReplyMetadata, RoomMessageEventContent,
        },
    },
};

use crate::{
    matrix::{
        UserCredentials,
        login::setup_client,
        session::MatrixSession,
        sync::{IncomingMessage, MatrixSync},
    },
    monitor::NotifyError,
};

/// Display name of the bot account.
const DISPLAY_NAME: &str = "Tally";

/// High-level Matrix client for bot messaging operations.
pub struct MatrixClient {
    /// Synchronization service for handling real-time events
    matrix_sync: MatrixSync,
    /// Underlying Matrix SDK client
    client: Client,
}

impl MatrixClient {
    /// Creates a logged-in Matrix client.
    ///
    /// # Arguments
    ///
    /// * `user_credentials` - Bot account credentials
    /// * `session_path` - Directory storing the session file and the SQLite store
    ///
    /// # Errors
    ///
    /// Returns an error if the login or the session restoration fails.
    pub async fn new(
        user_credentials: &UserCredentials,
        session_path: &Path,
    ) -> Result<Self, anyhow::Error> {
        tokio::fs::create_dir_all(session_path).await?;

        let matrix_session = MatrixSession::new(session_path).await;
        let client = setup_client(user_credentials, &matrix_session).await?;

        if let Err(e) = client.account().set_display_name(Some(DISPLAY_NAME)).await {
            warn!("failed to set display name: {:?}", e);
        }

        let matrix_sync = MatrixSync::new(&client, &matrix_session);

        Ok(MatrixClient {
            matrix_sync,
            client,
        })
    }

    /// Runs the Matrix synchronization loop, invoking `on_message` for each
    /// text message received in a joined room.
    ///
    /// Only returns when the sync loop ends, which it does not under normal operation.
    pub async fn sync<F>(&self, on_message: F)
    where
        F: Fn(IncomingMessage) + Send + Sync + 'static,
    {
        match self.matrix_sync.sync(on_message).await {
            Ok(_) => info!("matrix sync ended successfully"),
            Err(e) => error!("matrix sync ended with error: {:?}", e),
        }
    }

    /// Sends a plain text message to a room.
    ///
    /// # Errors
    ///
    /// * [`NotifyError::RoomUnavailable`] - invalid room id, unknown room or room not joined
    /// * [`NotifyError::Delivery`] - the homeserver did not accept the message
    pub async fn send_message(&self, room_id: &str, body: &str) -> Result<(), NotifyError> {
        let content = RoomMessageEventContent::text_plain(body);
        self.send(room_id, content).await
    }

    /// Sends a Markdown reply to a message. Failures are logged.
    ///
    /// # Arguments
    ///
    /// * `message` - The message being replied to
    /// * `body` - The reply content (supports Markdown formatting)
    pub async fn send_reply(&self, message: &IncomingMessage, body: &str) {
        let (Ok(sender), Ok(event)) = (
            UserId::parse(&message.sender_id),
            EventId::parse(&message.event_id),
        ) else {
            error!(
                "cannot reply to event {} from {}: invalid ids",
                message.event_id, message.sender_id
            );
            return;
        };

        let content = RoomMessageEventContent::text_markdown(body).make_reply_to(
            ReplyMetadata::new(&event, &sender, None),
            ForwardThread::No,
            AddMentions::No,
        );

        if let Err(e) = self.send(&message.room_id, content).await {
            error!("failed to send reply in {}: {}", message.room_id, e);
        }
    }

    async fn send(&self, room_id: &str, content: RoomMessageEventContent) -> Result<(), NotifyError> {
        let room_id_obj = RoomId::parse(room_id)
            .map_err(|_| NotifyError::RoomUnavailable(room_id.to_owned()))?;

        let room = match self.client.get_room(&room_id_obj) {
            Some(room) if room.state() == RoomState::Joined => room,
            _ => return Err(NotifyError::RoomUnavailable(room_id.to_owned())),
        };

        room.send(content)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        Ok(())
    }
}
