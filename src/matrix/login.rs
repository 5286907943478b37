//! Matrix client creation.
//!
//! Builds the SDK client on top of the SQLite store, then either restores the
//! login found in the session file or logs in with the account password and
//! persists the new login.

use anyhow::Context;
use log::{debug, info};
use matrix_sdk::{Client, ruma::OwnedUserId};

use crate::matrix::{UserCredentials, session::MatrixSession};

/// Device name shown in the other clients of the bot account.
const DEVICE_DISPLAY_NAME: &str = "tally bot";

/// Creates a logged-in Matrix client.
///
/// # Errors
///
/// Returns an error if:
/// - The user ID is not a valid Matrix ID
/// - The homeserver cannot be discovered or the store cannot be opened
/// - The persisted login is rejected or the password login fails
/// - The new login cannot be written to disk
pub async fn setup_client(
    user_credentials: &UserCredentials,
    matrix_session: &MatrixSession,
) -> Result<Client, anyhow::Error> {
    info!(
        "setting up matrix client for user {}",
        user_credentials.user_id
    );

    let user_id: OwnedUserId = user_credentials
        .user_id
        .as_str()
        .try_into()
        .with_context(|| format!("invalid matrix user id {}", user_credentials.user_id))?;

    let client = Client::builder()
        .server_name(user_id.server_name())
        .sqlite_store(matrix_session.get_sqlite_path(), None)
        .build()
        .await?;
    debug!("matrix client created");

    match matrix_session.get_user_session() {
        Some(user_session) => {
            info!("restoring matrix session from disk");
            client.restore_session(user_session.clone()).await?;
        }
        None => {
            info!("no matrix session on disk, logging in");
            client
                .matrix_auth()
                .login_username(user_id.as_str(), &user_credentials.password)
                .initial_device_display_name(DEVICE_DISPLAY_NAME)
                .send()
                .await?;

            let user_session = client
                .matrix_auth()
                .session()
                .context("no matrix session after login")?;
            matrix_session
                .persist_user_session(&user_session)
                .await
                .context("error persisting user session")?;
        }
    }

    info!("matrix client ready");
    Ok(client)
}
