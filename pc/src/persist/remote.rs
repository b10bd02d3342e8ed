//! Remote blob store client
//!
//! Writes session records to a remote blob store over HTTP: one JSON blob
//! per session at `{base}/{bucket}/{session-id}.json`, bearer-authenticated
//! with a token read from the environment. No retries - callers treat the
//! remote leg as best-effort and fall back to the local store.

use reqwest::Client;
use sessionstore::SessionRecord;
use thiserror::Error;
use tracing::debug;

use crate::config::StorageConfig;

/// Errors from the remote blob store
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("Remote store credentials not found. Set the {0} environment variable.")]
    MissingCredentials(String),

    #[error("Remote store returned status {status}")]
    Http { status: u16 },

    #[error("Remote store request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Remote store returned malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the remote session blob store
#[derive(Debug)]
pub struct RemoteStore {
    base_url: String,
    bucket: String,
    token: String,
    http: Client,
}

impl RemoteStore {
    /// Build a client from storage config
    ///
    /// Returns `None` when no remote URL is configured - the wizard then
    /// persists locally only. Credentials come from the environment variable
    /// named in config.
    pub fn from_config(config: &StorageConfig) -> Result<Option<Self>, RemoteStoreError> {
        let Some(ref base_url) = config.remote_url else {
            debug!("from_config: no remote URL configured");
            return Ok(None);
        };

        let token = std::env::var(&config.credentials_env)
            .map_err(|_| RemoteStoreError::MissingCredentials(config.credentials_env.clone()))?;

        Ok(Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            token,
            http: Client::new(),
        }))
    }

    fn blob_url(&self, session_id: &str) -> String {
        format!("{}/{}/{}.json", self.base_url, self.bucket, session_id)
    }

    /// Upload a record, replacing any prior blob for the same session
    pub async fn put(&self, record: &SessionRecord) -> Result<(), RemoteStoreError> {
        let url = self.blob_url(&record.session_id);
        debug!(%url, "put: called");

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteStoreError::Http { status: status.as_u16() });
        }

        debug!(session_id = %record.session_id, "put: uploaded");
        Ok(())
    }

    /// Fetch the last-uploaded record for a session
    pub async fn get(&self, session_id: &str) -> Result<SessionRecord, RemoteStoreError> {
        let url = self.blob_url(session_id);
        debug!(%url, "get: called");

        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteStoreError::Http { status: status.as_u16() });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_remote_url() {
        let config = StorageConfig::default();
        assert!(config.remote_url.is_none());
        assert!(RemoteStore::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_missing_credentials() {
        let config = StorageConfig {
            remote_url: Some("https://blobs.example.com".to_string()),
            credentials_env: "PRECODE_TEST_MISSING_CREDS".to_string(),
            ..Default::default()
        };

        let err = RemoteStore::from_config(&config).unwrap_err();
        assert!(matches!(err, RemoteStoreError::MissingCredentials(ref var) if var == "PRECODE_TEST_MISSING_CREDS"));
    }

    #[test]
    fn test_blob_url_shape() {
        let store = RemoteStore {
            base_url: "https://blobs.example.com".to_string(),
            bucket: "precode".to_string(),
            token: "t".to_string(),
            http: Client::new(),
        };
        assert_eq!(store.blob_url("sess-1"), "https://blobs.example.com/precode/sess-1.json");
    }
}
