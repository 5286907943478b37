//! Matrix client synchronization and event handling.
//!
//! [`MatrixSync::sync`]:
//! 1. Performs an initial sync to catch up on what happened while offline
//!    (invites are accepted, old messages are not answered)
//! 2. Registers the message handler
//! 3. Enters the continuous sync loop, persisting the sync token each time

use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{MessageType, OriginalSyncRoomMessageEvent},
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::matrix::session::MatrixSession;

/// Seconds between two attempts of the initial sync.
const INITIAL_SYNC_RETRY_SECS: u64 = 5;
/// Give up auto-joining a room once the backoff exceeds this many seconds.
const MAX_JOIN_DELAY_SECS: u64 = 3600;

/// A text message received in a joined room.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    /// The message text content
    pub body: String,
    /// The room where the message was sent
    pub room_id: String,
    /// The user who sent the message
    pub sender_id: String,
    /// The unique event identifier, used to reply
    pub event_id: String,
}

/// Drives the Matrix sync loop.
pub struct MatrixSync {
    /// The matrix client
    client: Client,
    /// The matrix session, for sync token persistence
    session: MatrixSession,
}

impl MatrixSync {
    /// Creates a new MatrixSync instance. Call [`MatrixSync::sync`] to start syncing.
    pub fn new(client: &Client, session: &MatrixSession) -> Self {
        MatrixSync {
            client: client.to_owned(),
            session: session.to_owned(),
        }
    }

    /// Syncs forever, invoking `on_message` for each new text message in a joined room.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync loop hits a fatal error. Sync token
    /// persistence errors are logged and do not stop the loop.
    pub async fn sync<F>(&self, on_message: F) -> Result<()>
    where
        F: Fn(IncomingMessage) + Send + Sync + 'static,
    {
        info!("start syncing");

        self.client.add_event_handler(auto_join_rooms);

        // Enable room members lazy-loading
        // See <https://spec.matrix.org/v1.6/client-server-api/#lazy-loading-room-members>.
        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());

        if let Some(sync_token) = self.session.get_sync_token() {
            sync_settings = sync_settings.token(sync_token);
        }

        // Catch up before the message handler exists, commands sent while offline are skipped
        let response = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response,
                Err(e) => {
                    error!(
                        "initial sync failed: {e}, retrying in {}s",
                        INITIAL_SYNC_RETRY_SECS
                    );
                    sleep(Duration::from_secs(INITIAL_SYNC_RETRY_SECS)).await;
                }
            }
        };
        if let Err(err) = self
            .session
            .persist_sync_token(response.next_batch.clone())
            .await
        {
            error!("failed to persist sync token: {:?}", err);
        }

        let on_message = Arc::new(on_message);
        self.client.add_event_handler(
            move |event: OriginalSyncRoomMessageEvent, room: Room| {
                let on_message = Arc::clone(&on_message);
                async move { on_room_message(event, room, &on_message) }
            },
        );

        sync_settings = sync_settings.token(response.next_batch);

        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                let response = sync_result?;

                if let Err(err) = self.session.persist_sync_token(response.next_batch).await {
                    error!("failed to persist sync token: {:?}", err);
                }

                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }
}

/// Joins rooms the bot is invited to, with exponential backoff.
///
/// See <https://github.com/matrix-org/synapse/issues/4345> for why joining
/// right after the invite can fail.
async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            error!(
                "failed to join room {} ({err:?}), retrying in {delay}s",
                room.room_id()
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > MAX_JOIN_DELAY_SECS {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }
        info!("joined room {}", room.room_id());
    });
}

/// Forwards text messages of joined rooms to the callback.
fn on_room_message<F>(event: OriginalSyncRoomMessageEvent, room: Room, on_message: &Arc<F>)
where
    F: Fn(IncomingMessage) + Send + Sync + 'static,
{
    if room.state() != RoomState::Joined {
        return;
    }

    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    on_message(IncomingMessage {
        body: text_content.body,
        room_id: room.room_id().to_string(),
        sender_id: event.sender.to_string(),
        event_id: event.event_id.to_string(),
    });
}
