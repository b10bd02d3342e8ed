//! Conversation orchestrator
//!
//! Owns the generation client and prompt loader and drives every generation
//! call the wizard makes. Input validation happens here, before any network
//! traffic: empty submissions and empty selections are rejected locally.
//! On a failed call the transcript keeps the user's message so the same
//! action can be retried without losing context.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    Feature, SessionState, WizardError, WizardStep, fallback_features, parse_features, parse_step_suggestion,
};
use crate::config::WizardConfig;
use crate::diagram::DiagramDocument;
use crate::llm::{CompletionRequest, GenerationClient, GenerationError, Message};
use crate::prompts::{PromptContext, PromptLoader};

/// A cleaned assistant reply plus any step suggestion it carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Visible reply text, suggestion tag stripped
    pub text: String,
    /// Step the model suggested transitioning to, if any
    pub suggested_step: Option<WizardStep>,
}

/// Drives all generation calls for a wizard session
///
/// At most one request is in flight per session; each method awaits its call
/// to completion before returning.
pub struct Orchestrator {
    llm: Arc<dyn GenerationClient>,
    prompts: PromptLoader,
    wizard: WizardConfig,
    max_tokens: u32,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn GenerationClient>, prompts: PromptLoader, wizard: WizardConfig, max_tokens: u32) -> Self {
        Self {
            llm,
            prompts,
            wizard,
            max_tokens,
        }
    }

    /// System-prompt template for conversational turns at the given step
    fn step_template(step: WizardStep) -> &'static str {
        match step {
            WizardStep::VisionMission => "vision",
            _ => "brainstorm",
        }
    }

    /// Last `max_context_turns` messages of the transcript
    fn context_window<'a>(&self, transcript: &'a [Message]) -> &'a [Message] {
        let skip = transcript.len().saturating_sub(self.wizard.max_context_turns);
        &transcript[skip..]
    }

    fn prompt_context(&self, state: &SessionState) -> PromptContext {
        let mut ctx = PromptContext::from_transcript(self.context_window(&state.transcript));
        if let Some(ref vm) = state.vision_mission {
            ctx.vision = Some(vm.vision.clone());
            ctx.mission = Some(vm.mission.clone());
        }
        ctx
    }

    /// One single-prompt call: the rendered template travels as the sole user
    /// message, with no system instruction
    async fn complete_prompt(&self, prompt: String) -> Result<String, WizardError> {
        let response = self
            .llm
            .complete(CompletionRequest {
                system_prompt: String::new(),
                messages: vec![Message::user(prompt)],
                max_tokens: self.max_tokens,
            })
            .await?;

        response
            .content
            .ok_or_else(|| GenerationError::InvalidResponse("Response carried no text".to_string()).into())
    }

    /// Submit one user message at the current step and return the reply
    ///
    /// The user message is appended to the transcript before the call and
    /// stays there even when the call fails, so a retry resubmits the same
    /// context. The assistant reply is appended only on success, with the
    /// suggestion tag already stripped.
    pub async fn advance(&self, state: &mut SessionState, user_text: &str) -> Result<Reply, WizardError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(WizardError::EmptyInput);
        }

        debug!(step = %state.step, "advance: called");
        state.transcript.push(Message::user(user_text));

        let system_prompt = self
            .prompts
            .render(Self::step_template(state.step), &self.prompt_context(state))
            .map_err(|e| WizardError::Prompt(e.to_string()))?;

        let response = self
            .llm
            .complete(CompletionRequest {
                system_prompt,
                messages: self.context_window(&state.transcript).to_vec(),
                max_tokens: self.max_tokens,
            })
            .await?;

        let Some(raw) = response.content else {
            return Err(GenerationError::InvalidResponse("Response carried no text".to_string()).into());
        };

        let (text, suggested_step) = parse_step_suggestion(&raw, self.wizard.case_insensitive_suggestions);
        state.transcript.push(Message::assistant(&text));

        info!(
            step = %state.step,
            suggested = ?suggested_step,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "advance: reply received"
        );

        Ok(Reply { text, suggested_step })
    }

    /// Offer a feature list personalized to the conversation
    ///
    /// This operation never fails: when generation errors or returns nothing
    /// parseable, the fixed fallback list is offered instead. The offered
    /// list is recorded in the session state either way.
    pub async fn offer_features(&self, state: &mut SessionState) -> Vec<Feature> {
        debug!("offer_features: called");

        let features = match self.personalized_features(state).await {
            Ok(features) => {
                info!(count = features.len(), "offer_features: personalized list");
                features
            }
            Err(e) => {
                warn!(error = %e, "offer_features: falling back to fixed list");
                fallback_features()
            }
        };

        state.offered_features = features.clone();
        features
    }

    async fn personalized_features(&self, state: &SessionState) -> Result<Vec<Feature>, WizardError> {
        let prompt = self
            .prompts
            .render("features", &self.prompt_context(state))
            .map_err(|e| WizardError::Prompt(e.to_string()))?;

        let raw = self.complete_prompt(prompt).await?;
        parse_features(&raw)
            .ok_or_else(|| GenerationError::InvalidResponse("No usable feature list in response".to_string()).into())
    }

    /// Lock in a feature selection and generate the combined flowchart
    ///
    /// Rejects an empty selection and any id not in the offered list before
    /// making a call. The normalized diagram is stored in the session state.
    pub async fn select_features(&self, state: &mut SessionState, ids: &[String]) -> Result<DiagramDocument, WizardError> {
        if ids.is_empty() {
            return Err(WizardError::NoFeaturesSelected);
        }
        for id in ids {
            if !state.offered_features.iter().any(|f| &f.id == id) {
                return Err(WizardError::UnknownFeature(id.clone()));
            }
        }

        debug!(count = ids.len(), "select_features: called");
        state.selected_features = ids.to_vec();

        let selected: Vec<Feature> = state
            .offered_features
            .iter()
            .filter(|f| ids.contains(&f.id))
            .cloned()
            .collect();

        let prompt = self
            .prompts
            .render("flowchart", &self.prompt_context(state).with_features(&selected))
            .map_err(|e| WizardError::Prompt(e.to_string()))?;

        let raw = self.complete_prompt(prompt).await?;
        let document = DiagramDocument::from_raw(&raw);

        info!(lines = document.normalized_text.lines().count(), "select_features: diagram generated");
        state.diagram = Some(document.clone());
        Ok(document)
    }

    /// Generate a micro-flow diagram for one selected feature
    pub async fn feature_flowchart(&self, state: &SessionState, id: &str) -> Result<DiagramDocument, WizardError> {
        let feature = state
            .offered_features
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| WizardError::UnknownFeature(id.to_string()))?;

        debug!(%id, "feature_flowchart: called");

        let prompt = self
            .prompts
            .render("feature-flowchart", &self.prompt_context(state).with_feature(feature))
            .map_err(|e| WizardError::Prompt(e.to_string()))?;

        let raw = self.complete_prompt(prompt).await?;
        Ok(DiagramDocument::from_raw(&raw))
    }
}
