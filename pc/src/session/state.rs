//! Wizard step machine and session state

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Feature, WizardError};
use crate::diagram::DiagramDocument;
use crate::llm::Message;

/// The linear wizard steps
///
/// `landing -> brainstorming -> vision-mission -> feature-selection -> diagram`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Landing,
    Brainstorming,
    VisionMission,
    FeatureSelection,
    Diagram,
}

impl WizardStep {
    /// The step that follows this one, if any
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Landing => Some(WizardStep::Brainstorming),
            WizardStep::Brainstorming => Some(WizardStep::VisionMission),
            WizardStep::VisionMission => Some(WizardStep::FeatureSelection),
            WizardStep::FeatureSelection => Some(WizardStep::Diagram),
            WizardStep::Diagram => None,
        }
    }

    /// Kebab-case name, matching suggestion tags and config values
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Landing => "landing",
            WizardStep::Brainstorming => "brainstorming",
            WizardStep::VisionMission => "vision-mission",
            WizardStep::FeatureSelection => "feature-selection",
            WizardStep::Diagram => "diagram",
        }
    }

    /// Parse a kebab-case step name
    pub fn parse(name: &str) -> Option<WizardStep> {
        match name {
            "landing" => Some(WizardStep::Landing),
            "brainstorming" => Some(WizardStep::Brainstorming),
            "vision-mission" => Some(WizardStep::VisionMission),
            "feature-selection" => Some(WizardStep::FeatureSelection),
            "diagram" => Some(WizardStep::Diagram),
            _ => None,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Vision/mission pair collected at the vision-mission step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisionMission {
    pub vision: String,
    pub mission: String,
}

/// All mutable state of one wizard run
///
/// Owned by the wizard loop and passed by mutable reference into the
/// orchestrator - there is no ambient global state. The transcript is
/// append-only during a session and ordering is significant; strict
/// user/assistant alternation is not enforced.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Generated session identifier (persistence key)
    pub session_id: String,
    /// Current wizard step
    pub step: WizardStep,
    /// Ordered conversation transcript
    pub transcript: Vec<Message>,
    /// Vision/mission pair once collected
    pub vision_mission: Option<VisionMission>,
    /// Features last offered to the user
    pub offered_features: Vec<Feature>,
    /// Ids of the features the user selected
    pub selected_features: Vec<String>,
    /// The last generated diagram
    pub diagram: Option<DiagramDocument>,
}

impl SessionState {
    /// Start a fresh session at the landing step
    pub fn new() -> Self {
        let session_id = uuid::Uuid::now_v7().to_string();
        debug!(%session_id, "SessionState::new: created");
        Self {
            session_id,
            step: WizardStep::Landing,
            transcript: Vec::new(),
            vision_mission: None,
            offered_features: Vec::new(),
            selected_features: Vec::new(),
            diagram: None,
        }
    }

    /// Move to the next step, verifying the transition is legal
    pub fn transition_to(&mut self, to: WizardStep) -> Result<(), WizardError> {
        if self.step.next() != Some(to) {
            return Err(WizardError::IllegalTransition { from: self.step, to });
        }
        debug!(from = %self.step, %to, "SessionState::transition_to");
        self.step = to;
        Ok(())
    }

    /// Restart the wizard: clear everything and mint a new session id
    ///
    /// A session record is created once per wizard run, so a restart is a
    /// new run, not a continuation.
    pub fn restart(&mut self) {
        debug!(old_session_id = %self.session_id, "SessionState::restart");
        *self = SessionState::new();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
