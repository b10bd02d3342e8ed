//! Wizard session management
//!
//! The interactive loop: reads user input with readline, drives the
//! orchestrator, surfaces step-suggestion banners, and persists the session
//! best-effort after every state-changing action.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::Config;
use crate::diagram::{DiagramDocument, DiagramRenderer, MmdcRenderer, RenderError};
use crate::llm::GenerationClient;
use crate::persist::SessionSaver;
use crate::prompts::PromptLoader;
use crate::session::{
    Orchestrator, SessionState, TransitionScheduler, VisionMission, WizardError, WizardEvent, WizardStep,
};

/// Interactive wizard session
pub struct WizardSession {
    orchestrator: Orchestrator,
    saver: SessionSaver,
    renderer: Box<dyn DiagramRenderer>,
    scheduler: TransitionScheduler,
    events: mpsc::Receiver<WizardEvent>,
    state: SessionState,
    suggestion_delay: Duration,
}

impl WizardSession {
    /// Create a new wizard session from config
    pub fn new(config: &Config, llm: Arc<dyn GenerationClient>) -> Result<Self> {
        let prompts = PromptLoader::new(".");
        let orchestrator = Orchestrator::new(llm, prompts, config.wizard.clone(), config.generation.max_tokens);
        let saver = SessionSaver::from_config(&config.storage)?;
        let renderer = Box::new(MmdcRenderer::from_config(&config.render));
        let (scheduler, events) = TransitionScheduler::new();

        Ok(Self {
            orchestrator,
            saver,
            renderer,
            scheduler,
            events,
            state: SessionState::new(),
            suggestion_delay: Duration::from_millis(config.wizard.suggestion_delay_ms),
        })
    }

    /// Run the wizard main loop
    pub async fn run(&mut self, initial_idea: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(idea) = initial_idea {
            println!("{} {}", ">".bright_green(), idea);
            self.submit(&idea).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let prompt = format!("{} ", format!("[{}]>", self.state.step).bright_green());

            match rl.readline(&prompt) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.submit(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.scheduler.teardown();
        self.saver.save(&self.state).await;
        println!("Session {} saved. Goodbye!", self.state.session_id.dimmed());
        Ok(())
    }

    /// Submit one user message at the current step
    async fn submit(&mut self, input: &str) {
        // The first submission leaves the landing page
        if self.state.step == WizardStep::Landing
            && let Err(e) = self.state.transition_to(WizardStep::Brainstorming)
        {
            println!("{} {}", "Error:".red(), e);
            return;
        }

        if matches!(self.state.step, WizardStep::FeatureSelection | WizardStep::Diagram) {
            println!(
                "{}",
                format!("Free-form chat is over; use /select or /flow here. Type {} for help.", "/help".yellow())
                    .dimmed()
            );
            return;
        }

        match self.orchestrator.advance(&mut self.state, input).await {
            Ok(reply) => {
                println!();
                println!("{}", reply.text);
                println!();
                self.saver.save(&self.state).await;

                if let Some(step) = reply.suggested_step {
                    self.scheduler.schedule(self.suggestion_delay, WizardEvent::SuggestStep(step));
                    self.surface_suggestion().await;
                }
            }
            Err(e) => self.print_wizard_error(&e),
        }
    }

    /// Wait out the suggestion delay and print the banner when it fires
    async fn surface_suggestion(&mut self) {
        let wait = self.suggestion_delay + Duration::from_millis(200);
        if let Ok(Some(WizardEvent::SuggestStep(step))) = tokio::time::timeout(wait, self.events.recv()).await {
            println!(
                "{}",
                format!("The assistant suggests moving on to {}. Type {} when ready.", step, "/next".yellow())
                    .bright_cyan()
            );
        }
    }

    /// Handle slash commands
    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/next" | "/n" => {
                self.advance_step().await;
                SlashResult::Continue
            }
            "/restart" => {
                self.scheduler.teardown();
                self.state.restart();
                println!("{}", "Session restarted.".dimmed());
                SlashResult::Continue
            }
            "/vision" => {
                self.set_vision_mission(parts.get(1..).unwrap_or(&[]).join(" "), true);
                SlashResult::Continue
            }
            "/mission" => {
                self.set_vision_mission(parts.get(1..).unwrap_or(&[]).join(" "), false);
                SlashResult::Continue
            }
            "/select" => {
                let ids: Vec<String> = parts[1..].iter().map(|s| s.to_string()).collect();
                self.select(&ids).await;
                SlashResult::Continue
            }
            "/flow" => {
                match parts.get(1) {
                    Some(id) => self.feature_flow(id).await,
                    None => println!("{} Usage: /flow <feature-id>", "?".yellow()),
                }
                SlashResult::Continue
            }
            "/save" => {
                self.saver.save(&self.state).await;
                println!("{}", "Session saved.".dimmed());
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    /// Move to the next wizard step
    async fn advance_step(&mut self) {
        let Some(next) = self.state.step.next() else {
            println!("{}", "This is the final step.".dimmed());
            return;
        };

        if let Err(e) = self.state.transition_to(next) {
            self.print_wizard_error(&e);
            return;
        }

        match next {
            WizardStep::Brainstorming => {
                println!("{}", "Tell me about your product idea.".bright_cyan());
            }
            WizardStep::VisionMission => {
                println!("{}", "Let's shape your vision and mission.".bright_cyan());
                println!(
                    "Chat freely, then record them with {} and {}.",
                    "/vision <text>".yellow(),
                    "/mission <text>".yellow()
                );
            }
            WizardStep::FeatureSelection => {
                let features = self.orchestrator.offer_features(&mut self.state).await;
                println!("{}", "Pick the features for your first version:".bright_cyan());
                for feature in &features {
                    println!("  {:16} {} - {}", feature.id.yellow(), feature.name.bold(), feature.description);
                }
                println!("Select with {}", "/select <id> <id> ...".yellow());
            }
            WizardStep::Diagram => {
                println!("{}", "Generating your flowchart...".bright_cyan());
            }
            WizardStep::Landing => {}
        }
    }

    fn set_vision_mission(&mut self, text: String, is_vision: bool) {
        if text.is_empty() {
            println!("{} Usage: /{} <text>", "?".yellow(), if is_vision { "vision" } else { "mission" });
            return;
        }

        let vm = self.state.vision_mission.get_or_insert_with(|| VisionMission {
            vision: String::new(),
            mission: String::new(),
        });
        if is_vision {
            vm.vision = text;
            println!("{}", "Vision recorded.".dimmed());
        } else {
            vm.mission = text;
            println!("{}", "Mission recorded.".dimmed());
        }
    }

    /// Lock in a selection, generate the combined flowchart, and render it
    async fn select(&mut self, ids: &[String]) {
        if self.state.step != WizardStep::FeatureSelection {
            println!("{}", "Feature selection happens at the feature-selection step.".dimmed());
            return;
        }

        let document = match self.orchestrator.select_features(&mut self.state, ids).await {
            Ok(document) => document,
            Err(e) => {
                self.print_wizard_error(&e);
                return;
            }
        };

        if let Err(e) = self.state.transition_to(WizardStep::Diagram) {
            self.print_wizard_error(&e);
            return;
        }
        self.saver.save(&self.state).await;

        self.show_diagram(&document).await;
    }

    /// Generate and show a micro-flow for one selected feature
    async fn feature_flow(&mut self, id: &str) {
        match self.orchestrator.feature_flowchart(&self.state, id).await {
            Ok(document) => self.show_diagram(&document).await,
            Err(e) => self.print_wizard_error(&e),
        }
    }

    /// Print the normalized markup and attempt a render
    ///
    /// A render failure shows a fallback panel with the markup and the error;
    /// it is never retried automatically.
    async fn show_diagram(&mut self, document: &DiagramDocument) {
        println!();
        println!("{}", document.normalized_text);
        println!();

        match self.renderer.render(&document.normalized_text).await {
            Ok(svg) => {
                let path = format!("precode-{}.svg", self.state.session_id);
                match std::fs::write(&path, svg) {
                    Ok(()) => println!("{} {}", "Rendered to".green(), path.bold()),
                    Err(e) => println!("{} {}", "Could not write SVG:".red(), e),
                }
            }
            Err(RenderError::Unavailable(bin)) => {
                println!("{}", format!("Renderer '{}' not found; showing markup only.", bin).yellow());
            }
            Err(e) => {
                debug!(error = %e, "show_diagram: render failed");
                for line in render_failure_panel(&e) {
                    println!("{}", line);
                }
            }
        }
    }

    fn print_wizard_error(&self, error: &WizardError) {
        println!("{} {}", "Error:".red(), error);
        if let WizardError::Generation(generation) = error
            && let Some(wait) = generation.retry_after()
        {
            println!("{}", format!("Rate limited; wait about {}s before retrying.", wait.as_secs()).dimmed());
        }
        if error.is_recoverable() {
            println!("{}", "Your message is kept; just try again.".dimmed());
        }
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "precode - from idea to flowchart".bright_cyan().bold());
        println!("Session: {}", self.state.session_id.dimmed());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
        println!("What are you building?");
        println!();
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:22} Show this help", "/help".yellow());
        println!("  {:22} Save and exit", "/quit".yellow());
        println!("  {:22} Move to the next wizard step", "/next".yellow());
        println!("  {:22} Start over with a fresh session", "/restart".yellow());
        println!("  {:22} Record your vision statement", "/vision <text>".yellow());
        println!("  {:22} Record your mission statement", "/mission <text>".yellow());
        println!("  {:22} Select features and generate the flowchart", "/select <id> ...".yellow());
        println!("  {:22} Generate a micro-flow for one feature", "/flow <id>".yellow());
        println!("  {:22} Save the session now", "/save".yellow());
        println!();
        println!(
            "Steps: {} -> {} -> {} -> {} -> {}",
            "landing".dimmed(),
            "brainstorming",
            "vision-mission",
            "feature-selection",
            "diagram"
        );
        println!();
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}

/// Fallback panel for a failed render: the error, the markup reassurance, and
/// the way out
fn render_failure_panel(error: &RenderError) -> Vec<String> {
    vec![
        "Diagram could not be rendered:".red().to_string(),
        format!("  {}", error),
        "The markup above is still valid input for any mermaid renderer.".dimmed().to_string(),
        format!("Type {} to start over, or keep going with the markup above.", "/restart".yellow())
            .dimmed()
            .to_string(),
    ]
}
