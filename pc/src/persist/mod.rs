//! Session persistence
//!
//! Each wizard run is persisted as a single blob keyed by session id,
//! overwritten in full on every save. The remote store is tried first when
//! configured; the local store is the fallback. Persistence is best-effort
//! everywhere: a failed save is logged and never interrupts the wizard.

mod remote;
mod saver;

pub use remote::{RemoteStore, RemoteStoreError};
pub use saver::{SaveDestination, SessionSaver};

use sessionstore::{SessionRecord, StoredMessage, VisionMission};

use crate::session::SessionState;

/// Build the persisted record for the current session state
pub fn record_from_state(state: &SessionState) -> SessionRecord {
    let mut record = SessionRecord::new(state.session_id.clone());

    record.transcript = state
        .transcript
        .iter()
        .map(|m| StoredMessage {
            role: m.role.as_str().to_string(),
            text: m.text.clone(),
        })
        .collect();

    record.vision_mission = state.vision_mission.as_ref().map(|vm| VisionMission {
        vision: vm.vision.clone(),
        mission: vm.mission.clone(),
    });

    record.selected_features = state.selected_features.clone();
    record.diagram = state.diagram.as_ref().map(|d| d.normalized_text.clone());
    record.update_summary();

    record
}
