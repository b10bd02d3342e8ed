//! Core SessionStore implementation

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Unique identifier for a session
pub type SessionId = String;

/// One message of the wizard transcript as persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessage {
    /// "user" or "assistant"
    pub role: String,
    /// Message text
    pub text: String,
}

/// Vision/mission pair collected by the wizard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisionMission {
    pub vision: String,
    pub mission: String,
}

/// Derived counts stored alongside the record for quick inspection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub features_selected: usize,
    pub has_vision_mission: bool,
    pub has_diagram: bool,
}

/// The persisted state of one wizard run
///
/// Overwritten in full on each save - the store never versions records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Generated session identifier (persistence key)
    pub session_id: SessionId,
    /// Last save timestamp (unix ms)
    pub saved_at: i64,
    /// Ordered transcript, insertion order significant
    pub transcript: Vec<StoredMessage>,
    /// Vision/mission pair, if the wizard reached that step
    pub vision_mission: Option<VisionMission>,
    /// Ids of the features the user selected
    pub selected_features: Vec<String>,
    /// Normalized diagram markup from the last diagram request
    pub diagram: Option<String>,
    /// Derived counts, recomputed on save
    pub summary: SessionSummary,
}

impl SessionRecord {
    /// Create an empty record for a session
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            saved_at: chrono::Utc::now().timestamp_millis(),
            transcript: Vec::new(),
            vision_mission: None,
            selected_features: Vec::new(),
            diagram: None,
            summary: SessionSummary::default(),
        }
    }

    /// Recompute the derived summary from the record contents
    pub fn update_summary(&mut self) {
        self.summary = SessionSummary {
            total_messages: self.transcript.len(),
            user_messages: self.transcript.iter().filter(|m| m.role == "user").count(),
            assistant_messages: self.transcript.iter().filter(|m| m.role == "assistant").count(),
            features_selected: self.selected_features.len(),
            has_vision_mission: self.vision_mission.is_some(),
            has_diagram: self.diagram.is_some(),
        };
    }
}

/// The main session store
pub struct SessionStore {
    /// Base path for storage
    base_path: PathBuf,
}

impl SessionStore {
    /// Open or create a session store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(?base_path, "Opened session store");
        Ok(Self { base_path })
    }

    fn record_path(&self, session_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", session_id))
    }

    /// Save a record, replacing any prior blob for the same session
    ///
    /// Writes to a temp file and renames so a crash never leaves a
    /// half-written record behind.
    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        let mut record = record.clone();
        record.saved_at = chrono::Utc::now().timestamp_millis();
        record.update_summary();

        let content = serde_json::to_string_pretty(&record).context("Failed to serialize session record")?;

        let final_path = self.record_path(&record.session_id);
        let tmp_path = self.base_path.join(format!(".{}.tmp", record.session_id));

        fs::write(&tmp_path, content).context("Failed to write session record")?;
        fs::rename(&tmp_path, &final_path).context("Failed to replace session record")?;

        info!(session_id = %record.session_id, "Saved session record");
        Ok(())
    }

    /// Load the last-written record for a session
    pub fn load(&self, session_id: &str) -> Result<SessionRecord> {
        let path = self.record_path(session_id);
        if !path.exists() {
            return Err(eyre::eyre!("Session not found: {}", session_id));
        }

        let content = fs::read_to_string(&path).context(format!("Failed to read session: {}", session_id))?;
        let record = serde_json::from_str(&content).context(format!("Corrupt session record: {}", session_id))?;
        Ok(record)
    }

    /// List all session ids in the store
    pub fn list(&self) -> Result<Vec<SessionId>> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                sessions.push(stem.to_string());
            }
        }

        sessions.sort();
        Ok(sessions)
    }

    /// Delete a session's record
    pub fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.record_path(session_id);
        if path.exists() {
            fs::remove_file(&path)?;
            info!(session_id, "Deleted session record");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record(id: &str) -> SessionRecord {
        let mut record = SessionRecord::new(id.to_string());
        record.transcript.push(StoredMessage {
            role: "user".to_string(),
            text: "A fitness app".to_string(),
        });
        record.transcript.push(StoredMessage {
            role: "assistant".to_string(),
            text: "Tell me more about your target users.".to_string(),
        });
        record.selected_features = vec!["user-auth".to_string()];
        record
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        let record = sample_record("sess-1");
        store.save(&record).unwrap();

        let loaded = store.load("sess-1").unwrap();
        assert_eq!(loaded.session_id, "sess-1");
        assert_eq!(loaded.transcript, record.transcript);
        assert_eq!(loaded.summary.total_messages, 2);
        assert_eq!(loaded.summary.user_messages, 1);
        assert_eq!(loaded.summary.assistant_messages, 1);
        assert_eq!(loaded.summary.features_selected, 1);
        assert!(!loaded.summary.has_diagram);
    }

    #[test]
    fn test_save_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        let mut record = sample_record("sess-2");
        store.save(&record).unwrap();

        record.diagram = Some("flowchart TD\nA[Start] --> B[End]".to_string());
        store.save(&record).unwrap();

        // Only one blob, holding the latest content
        assert_eq!(store.list().unwrap(), vec!["sess-2".to_string()]);
        let loaded = store.load("sess-2").unwrap();
        assert!(loaded.summary.has_diagram);
    }

    #[test]
    fn test_load_not_found() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        let result = store.load("nope");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_list_and_delete() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::open(temp.path()).unwrap();

        store.save(&sample_record("a")).unwrap();
        store.save(&sample_record("b")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.delete("a").unwrap();
        assert_eq!(store.list().unwrap(), vec!["b".to_string()]);

        // Deleting a missing session is not an error
        store.delete("a").unwrap();
    }
}
