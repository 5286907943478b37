use std::path::{Path, PathBuf};

use log::{debug, trace};
use matrix_sdk::authentication::matrix;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Session file content.
///
/// The Matrix login and the last sync token, serialized to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    /// Access token and device of the bot account.
    user_session: matrix::MatrixSession,

    /// Sync token to resume from, omitted until the first sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// On-disk state of the Matrix connection.
///
/// The session directory contains:
/// - `session`: JSON file with the login and the sync token
/// - `sqlite`: SQLite database used by the Matrix SDK (room state, crypto store)
///
/// Only the transport is persisted here. The monitor state is never saved.
#[derive(Clone)]
pub struct MatrixSession {
    /// Session loaded at startup, if any.
    session: Option<Session>,
    /// `dir_path/sqlite`
    sqlite_path: PathBuf,
    /// `dir_path/session`
    session_path: PathBuf,
}

impl MatrixSession {
    /// Opens the session directory and loads the session file if there is a valid one.
    ///
    /// A missing or unreadable session file is not an error: the bot logs in again.
    pub async fn new(dir_path: &Path) -> MatrixSession {
        let sqlite_path = dir_path.join("sqlite");
        let session_path = dir_path.join("session");
        debug!("session at {:?}, store at {:?}", session_path, sqlite_path);

        let session = match MatrixSession::read_session(&session_path).await {
            Ok(session) => Some(session),
            Err(e) => {
                debug!("no usable session at {:?}: {}", session_path, e);
                None
            }
        };

        MatrixSession {
            session,
            sqlite_path,
            session_path,
        }
    }

    async fn read_session(session_path: &Path) -> anyhow::Result<Session> {
        let session_data = fs::read_to_string(session_path).await?;
        let session: Session = serde_json::from_str(&session_data)?;
        Ok(session)
    }

    pub fn get_sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    /// Login found on disk at startup.
    pub fn get_user_session(&self) -> Option<&matrix::MatrixSession> {
        self.session.as_ref().map(|s| &s.user_session)
    }

    /// Sync token found on disk at startup.
    pub fn get_sync_token(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.sync_token.clone())
    }

    /// Writes a fresh login, dropping any previous sync token.
    pub async fn persist_user_session(
        &self,
        user_session: &matrix::MatrixSession,
    ) -> anyhow::Result<()> {
        trace!("persist user session");

        let session = Session {
            user_session: user_session.clone(),
            sync_token: None,
        };
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;

        trace!("user session persisted");
        Ok(())
    }

    /// Updates the sync token of the session file.
    ///
    /// # Errors
    ///
    /// Fails when no login has been persisted yet.
    pub async fn persist_sync_token(&self, sync_token: String) -> anyhow::Result<()> {
        trace!("persist sync token {}", sync_token);

        let mut session = MatrixSession::read_session(&self.session_path).await?;
        session.sync_token = Some(sync_token);
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;

        trace!("sync token persisted");
        Ok(())
    }
}
