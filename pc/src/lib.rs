//! precode - LLM-backed product-ideation wizard
//!
//! precode walks a founder from a one-line idea to a rendered user-flow
//! diagram: a linear wizard accumulates a brainstorming transcript, collects
//! a vision/mission pair, offers a feature list, and turns the whole
//! conversation into strict flowchart markup via a repair pass over whatever
//! the generation service returns.
//!
//! # Core Concepts
//!
//! - **Explicit session state**: the wizard step machine and transcript live
//!   in one owned struct, never in ambient globals
//! - **One call in flight**: every generation request is awaited to completion
//!   before the next user action is accepted
//! - **Repair, don't reject**: generated diagram text is normalized into the
//!   strict grammar instead of being bounced back to the service
//! - **Best-effort persistence**: session records save remotely when
//!   configured, falling back to the local store; failures never end a session
//!
//! # Modules
//!
//! - [`llm`] - Generation client trait and Gemini implementation
//! - [`diagram`] - Diagram text normalizer and rendering adapter
//! - [`session`] - Wizard state machine and conversation orchestrator
//! - [`persist`] - Remote blob persistence with local fallback
//! - [`prompts`] - Handlebars prompt templates
//! - [`wizard`] - Interactive terminal wizard
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod diagram;
pub mod llm;
pub mod persist;
pub mod prompts;
pub mod session;
pub mod wizard;

// Re-export commonly used types
pub use config::{Config, GenerationConfig, RenderConfig, StorageConfig, WizardConfig};
pub use diagram::{DiagramDocument, DiagramRenderer, MmdcRenderer, RenderError, normalize};
pub use llm::{CompletionRequest, CompletionResponse, GeminiClient, GenerationClient, GenerationError, Message, Role};
pub use persist::SessionSaver;
pub use session::{
    Feature, Orchestrator, Reply, SessionState, TransitionScheduler, VisionMission, WizardError, WizardEvent,
    WizardStep,
};
