//! Players command handler.
//!
//! Probes the monitored server and replies with its address and the number of
//! connected players. This is a read-only command, it does not touch the
//! monitor state.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use log::{debug, error, info};

use crate::{
    commands::{
        CommandContext, CommandResult,
        markdown_response::{format_players, format_players_error},
    },
    status::Probe,
};

/// Replies with the current player count.
///
/// The probe already turns request failures into `0`. Anything that still
/// escapes it (a panic while probing) is caught here and replaced by a fixed
/// error reply.
pub async fn handle_players<P: Probe>(context: &CommandContext<'_, P>) -> CommandResult {
    debug!("handling players command");

    let response = match AssertUnwindSafe(context.prober.probe())
        .catch_unwind()
        .await
    {
        Ok(count) => {
            info!(
                "players command from {} in {}: {} players",
                context.user_id, context.room_id, count
            );
            format_players(context.server_address, count)
        }
        Err(_) => {
            error!(
                "players command from {} in {} failed while probing {}",
                context.user_id, context.room_id, context.server_address
            );
            format_players_error()
        }
    };

    CommandResult { response }
}
