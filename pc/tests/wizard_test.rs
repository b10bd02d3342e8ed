//! End-to-end wizard flow tests against a scripted generation client

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use precode::config::{StorageConfig, WizardConfig};
use precode::persist::{SaveDestination, SessionSaver};
use precode::prompts::PromptLoader;
use precode::session::{Orchestrator, SessionState, VisionMission, WizardStep};
use precode::{CompletionRequest, CompletionResponse, GenerationClient, GenerationError};
use sessionstore::SessionStore;

/// Scripted client: replies with canned texts, in order
struct ScriptedClient {
    replies: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, GenerationError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(idx) {
            Some(text) => Ok(CompletionResponse {
                content: Some(text.clone()),
                usage: Default::default(),
            }),
            None => Err(GenerationError::InvalidResponse("script exhausted".to_string())),
        }
    }
}

fn orchestrator(client: Arc<ScriptedClient>) -> Orchestrator {
    Orchestrator::new(client, PromptLoader::embedded_only(), WizardConfig::default(), 2048)
}

#[tokio::test]
async fn test_full_wizard_run() {
    let client = Arc::new(ScriptedClient::new(&[
        // Brainstorm reply with a step suggestion
        "A meal-planning app, great. Who cooks at home?\n\n[SUGGEST_STEP:vision-mission]",
        // Vision-mission coaching reply
        "Your vision could center on effortless weeknight cooking.",
        // Personalized feature list
        r#"[
            {"id": "meal-planner", "name": "Weekly Meal Planner", "description": "Plan a week of dinners"},
            {"id": "grocery-list", "name": "Grocery List", "description": "Auto-built from the plan"}
        ]"#,
        // Combined flowchart, deliberately messy
        "```mermaid\nA [Open app] --> B{Plan exists?}\nB -->| yes | C[Show plan]\nB -->|no| D[\"Create plan\"]\n```",
    ]));
    let orchestrator = orchestrator(client.clone());
    let mut state = SessionState::new();

    // Landing -> brainstorming
    state.transition_to(WizardStep::Brainstorming).unwrap();
    let reply = orchestrator.advance(&mut state, "A meal-planning app").await.unwrap();
    assert_eq!(reply.suggested_step, Some(WizardStep::VisionMission));
    assert!(!reply.text.contains("[SUGGEST_STEP"));

    // Brainstorming -> vision-mission
    state.transition_to(WizardStep::VisionMission).unwrap();
    orchestrator.advance(&mut state, "Busy parents").await.unwrap();
    state.vision_mission = Some(VisionMission {
        vision: "Effortless weeknight cooking".to_string(),
        mission: "Plan once, cook all week".to_string(),
    });

    // Vision-mission -> feature-selection
    state.transition_to(WizardStep::FeatureSelection).unwrap();
    let features = orchestrator.offer_features(&mut state).await;
    assert_eq!(features.len(), 2);
    assert_eq!(features[0].id, "meal-planner");

    // Select and generate the flowchart
    let document = orchestrator
        .select_features(&mut state, &["meal-planner".to_string(), "grocery-list".to_string()])
        .await
        .unwrap();
    state.transition_to(WizardStep::Diagram).unwrap();

    assert!(document.normalized_text.starts_with("flowchart TD"));
    assert!(!document.normalized_text.contains("```"));
    assert!(!document.normalized_text.contains('"'));
    // Arrow spacing and pipe labels repaired
    assert!(document.normalized_text.contains("B -->|yes| C[Show plan]"));
    assert!(document.normalized_text.contains("A[Open app] --> B{Plan exists?}"));

    assert_eq!(state.step, WizardStep::Diagram);
    assert_eq!(client.call_count(), 4);
}

#[tokio::test]
async fn test_wizard_run_survives_generation_outage() {
    // Every call fails: brainstorming errors are recoverable, the feature
    // offer falls back to the fixed list
    let client = Arc::new(ScriptedClient::new(&[]));
    let orchestrator = orchestrator(client);
    let mut state = SessionState::new();
    state.transition_to(WizardStep::Brainstorming).unwrap();

    let err = orchestrator.advance(&mut state, "An app idea").await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(state.transcript.len(), 1);

    let features = orchestrator.offer_features(&mut state).await;
    assert_eq!(features.len(), 8);
    assert!(features.iter().any(|f| f.id == "user-auth"));
}

#[tokio::test]
async fn test_wizard_state_persists_and_reloads() {
    let client = Arc::new(ScriptedClient::new(&[
        "Sounds promising.",
        "flowchart TD\nA[Start] --> B[End]",
    ]));
    let orchestrator = orchestrator(client);
    let mut state = SessionState::new();
    state.transition_to(WizardStep::Brainstorming).unwrap();
    orchestrator.advance(&mut state, "A journaling app").await.unwrap();
    state.offered_features = precode::session::fallback_features();
    orchestrator
        .select_features(&mut state, &["user-auth".to_string()])
        .await
        .unwrap();

    let temp = TempDir::new().unwrap();
    let storage = StorageConfig {
        store_dir: temp.path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    let saver = SessionSaver::from_config(&storage).unwrap();
    assert_eq!(saver.save(&state).await, SaveDestination::Local);

    let store = SessionStore::open(temp.path()).unwrap();
    let record = store.load(&state.session_id).unwrap();
    assert_eq!(record.summary.total_messages, 2);
    assert_eq!(record.selected_features, vec!["user-auth"]);
    assert!(record.summary.has_diagram);
    assert_eq!(record.diagram.as_deref(), Some("flowchart TD\nA[Start] --> B[End]"));
}
