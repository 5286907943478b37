//! Bot module wiring the status prober, the alert monitor and Matrix.
//!
//! # Architecture
//!
//! The bot runs two concurrent activities:
//!
//! 1. **Monitor Task**: a supervised background task polling the player count
//!    and posting alerts in the destination room.
//! 2. **Matrix Sync**: listens for Matrix messages and answers `!players`,
//!    each command being handled in its own task.
//!
//! The only thing they share is the prober, which is read-only, so no lock is
//! needed. The monitor state lives inside the monitor task.
//!
//! # Shutdown
//!
//! ```text
//! shutdown token → stop Matrix sync → cancel monitor → await monitor → drop transport
//! ```

use std::{path::Path, sync::Arc};

use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::{
    Args,
    commands::{CommandContext, CommandParseError, Commander},
    config::Config,
    matrix::{IncomingMessage, MatrixClient, RoomNotifier, UserCredentials},
    monitor::{AlertMonitor, MonitorTimings},
    status::{StatusProber, StatusRequester},
};

type Prober = StatusProber<StatusRequester>;

/// Everything a command handler task needs.
struct MessageContext {
    /// The received message
    message: IncomingMessage,
    /// Matrix client used to reply
    matrix_client: Arc<MatrixClient>,
    /// Prober shared with the monitor
    prober: Arc<Prober>,
    /// Address of the monitored server
    server_address: Arc<str>,
    /// Command parser and executor
    commander: Arc<Commander>,
}

/// Main bot structure.
///
/// Owns the shared components; the monitor is built here and moved into its
/// task by [`Bot::start`].
pub struct Bot {
    /// Matrix client for sending alerts and replies.
    matrix_client: Arc<MatrixClient>,

    /// Player count source, shared between the monitor and the command handlers.
    prober: Arc<Prober>,

    /// Address of the monitored server.
    server_address: Arc<str>,

    /// Minimum number of players that triggers an alert.
    threshold: u32,

    /// Room receiving the alerts.
    room_id: String,

    /// Loop cadence of the monitor.
    timings: MonitorTimings,

    /// Command parser and executor.
    commander: Arc<Commander>,
}

impl Bot {
    /// Creates a new Bot from the configuration and the command line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or if the Matrix
    /// login or session restoration fails.
    pub async fn new(config: Config, args: Args) -> Result<Self, anyhow::Error> {
        let requester = StatusRequester::new(&config.status.url, config.status.request_timeout())?;
        let prober = Arc::new(StatusProber::new(
            requester,
            &config.status.server_address,
        ));

        let matrix_client = Arc::new(
            MatrixClient::new(
                &UserCredentials {
                    user_id: config.matrix.user_id,
                    password: config.matrix.password,
                },
                &Path::new(&args.data).join("session"),
            )
            .await?,
        );

        Ok(Bot {
            matrix_client,
            prober,
            timings: config.status.timings(),
            server_address: Arc::from(config.status.server_address.as_str()),
            threshold: config.status.threshold,
            room_id: config.matrix.room_id,
            commander: Arc::new(Commander::new()),
        })
    }

    /// Runs the bot until `shutdown` is cancelled.
    ///
    /// The monitor task is cancelled and awaited before returning, so no
    /// probe or alert is in flight when the Matrix client is dropped.
    pub async fn start(self, shutdown: CancellationToken) {
        let monitor_token = shutdown.child_token();
        let monitor = AlertMonitor::new(
            Arc::clone(&self.prober),
            RoomNotifier::new(Arc::clone(&self.matrix_client), &self.room_id),
            self.threshold,
            &self.server_address,
            self.timings,
        );
        info!("alerts go to room {}", self.room_id);
        let monitor_handle = tokio::spawn(monitor.run(monitor_token.clone()));

        let matrix_client = Arc::clone(&self.matrix_client);
        let prober = Arc::clone(&self.prober);
        let server_address = Arc::clone(&self.server_address);
        let commander = Arc::clone(&self.commander);

        let on_message = move |message: IncomingMessage| {
            Self::handle_matrix_message(MessageContext {
                message,
                matrix_client: Arc::clone(&matrix_client),
                prober: Arc::clone(&prober),
                server_address: Arc::clone(&server_address),
                commander: Arc::clone(&commander),
            })
        };

        tokio::select! {
            _ = shutdown.cancelled() => info!("shutdown requested"),
            _ = self.matrix_client.sync(on_message) => error!("matrix sync stopped"),
        }

        monitor_token.cancel();
        if let Err(e) = monitor_handle.await {
            error!("monitor task ended abnormally: {}", e);
        }
        info!("bot stopped");
    }

    /// Handles an incoming Matrix message in its own task.
    ///
    /// Messages that are not commands are ignored. Replies are sent in the room
    /// the command came from.
    fn handle_matrix_message(ctx: MessageContext) {
        tokio::spawn(async move {
            let command = match ctx.commander.parse(&ctx.message.body) {
                Ok(command) => command,
                Err(CommandParseError::NotForBot) => return,
            };

            let command_context = CommandContext {
                prober: ctx.prober.as_ref(),
                server_address: &ctx.server_address,
                room_id: ctx.message.room_id.clone(),
                user_id: ctx.message.sender_id.clone(),
            };

            let result = ctx
                .commander
                .parse_command(&command, &command_context)
                .await;

            ctx.matrix_client
                .send_reply(&ctx.message, &result.response)
                .await;
        });
    }
}
