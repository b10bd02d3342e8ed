//! Wizard session state and conversation orchestration
//!
//! The wizard is a linear step machine; all mutable session state lives in
//! [`SessionState`] and is passed by reference into the [`Orchestrator`],
//! which owns the generation client and issues at most one call per user
//! action.

mod features;
mod orchestrator;
mod state;
mod suggestion;
mod timers;

pub use features::{Feature, fallback_features, parse_features};
pub use orchestrator::{Orchestrator, Reply};
pub use state::{SessionState, VisionMission, WizardStep};
pub use suggestion::parse_step_suggestion;
pub use timers::{TransitionScheduler, WizardEvent};

use thiserror::Error;

use crate::llm::GenerationError;

/// Errors surfaced by wizard operations
///
/// Input-validation failures are rejected locally before any network call;
/// generation failures are recoverable and leave the transcript intact so
/// the caller may retry.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Submission is empty")]
    EmptyInput,

    #[error("No features selected")]
    NoFeaturesSelected,

    #[error("Unknown feature id: {0}")]
    UnknownFeature(String),

    #[error("Illegal step transition: {from} -> {to}")]
    IllegalTransition { from: WizardStep, to: WizardStep },

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl WizardError {
    /// True when the caller may simply try the same action again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WizardError::Generation(_))
    }
}
