//! Best-effort session saver
//!
//! Tries the remote store first when one is configured, then falls back to
//! the local store. A save that fails both legs is logged and swallowed -
//! losing a session record must never crash a wizard run.

use eyre::{Context, Result};
use sessionstore::{SessionRecord, SessionStore};
use tracing::{debug, info, warn};

use super::{RemoteStore, record_from_state};
use crate::config::StorageConfig;
use crate::session::SessionState;

/// Where a save attempt ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDestination {
    Remote,
    Local,
    /// Both legs failed; the record was not persisted
    Nowhere,
}

/// Persists session state to the configured stores
pub struct SessionSaver {
    local: SessionStore,
    remote: Option<RemoteStore>,
}

impl SessionSaver {
    /// Open the local store and, when configured, the remote client
    ///
    /// Fails fast: a configured remote with missing credentials is a startup
    /// error, not something to discover mid-session.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let local = SessionStore::open(&config.store_dir)
            .context(format!("Failed to open session store at {}", config.store_dir))?;
        let remote = RemoteStore::from_config(config).context("Failed to configure remote session store")?;

        debug!(store_dir = %config.store_dir, has_remote = remote.is_some(), "from_config: ready");
        Ok(Self { local, remote })
    }

    /// Save the current session state, best-effort
    pub async fn save(&self, state: &SessionState) -> SaveDestination {
        let record = record_from_state(state);

        if let Some(ref remote) = self.remote {
            match remote.put(&record).await {
                Ok(()) => {
                    info!(session_id = %record.session_id, "save: persisted remotely");
                    return SaveDestination::Remote;
                }
                Err(e) => {
                    warn!(session_id = %record.session_id, error = %e, "save: remote failed, falling back to local");
                }
            }
        }

        match self.local.save(&record) {
            Ok(()) => {
                info!(session_id = %record.session_id, "save: persisted locally");
                SaveDestination::Local
            }
            Err(e) => {
                warn!(session_id = %record.session_id, error = %e, "save: local store failed, record lost");
                SaveDestination::Nowhere
            }
        }
    }

    /// Load a session record, preferring the remote copy when configured
    ///
    /// The remote copy is authoritative when both legs hold the session (a
    /// remote save never writes locally). A failed remote fetch falls back to
    /// the local store.
    pub async fn load(&self, session_id: &str) -> Result<SessionRecord> {
        if let Some(ref remote) = self.remote {
            match remote.get(session_id).await {
                Ok(record) => {
                    info!(%session_id, "load: fetched from remote");
                    return Ok(record);
                }
                Err(e) => {
                    warn!(%session_id, error = %e, "load: remote failed, falling back to local");
                }
            }
        }

        self.local.load(session_id)
    }
}
