//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::llm::Message;
use crate::session::Feature;

/// Context for rendering prompt templates
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    /// Rendered transcript ("user: ...\nassistant: ..." per line)
    pub transcript: String,
    /// Selected feature names/descriptions, one "- name: description" per line
    pub features: String,
    /// Vision statement, if collected
    pub vision: Option<String>,
    /// Mission statement, if collected
    pub mission: Option<String>,
    /// Single feature name (micro-flow prompts)
    pub feature_name: Option<String>,
    /// Single feature description (micro-flow prompts)
    pub feature_description: Option<String>,
}

impl PromptContext {
    /// Build a context from a transcript
    pub fn from_transcript(messages: &[Message]) -> Self {
        Self {
            transcript: render_transcript(messages),
            ..Default::default()
        }
    }

    /// Attach a rendered feature list
    pub fn with_features(mut self, features: &[Feature]) -> Self {
        self.features = features
            .iter()
            .map(|f| format!("- {}: {}", f.name, f.description))
            .collect::<Vec<_>>()
            .join("\n");
        self
    }

    /// Attach a single feature for micro-flow prompts
    pub fn with_feature(mut self, feature: &Feature) -> Self {
        self.feature_name = Some(feature.name.clone());
        self.feature_description = Some(feature.description.clone());
        self
    }
}

/// Render a transcript into the "role: text" lines the prompts embed
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (`.precode/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (`prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let user_dir = root.join(".precode/prompts");
        let repo_dir = root.join("prompts");

        debug!(?user_dir, ?repo_dir, "PromptLoader::new: checking directories");

        Self {
            hbs: Handlebars::new(),
            user_dir: user_dir.exists().then_some(user_dir),
            repo_dir: repo_dir.exists().then_some(repo_dir),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        Self {
            hbs: Handlebars::new(),
            user_dir: None,
            repo_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.precode/prompts/{name}.pmt`
    /// 2. Repo default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        if let Some(ref repo_dir) = self.repo_dir {
            let path = repo_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in repo");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read repo prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript() {
        let messages = vec![Message::user("A fitness app"), Message::assistant("Who is it for?")];
        assert_eq!(
            render_transcript(&messages),
            "user: A fitness app\nassistant: Who is it for?"
        );
    }

    #[test]
    fn test_render_flowchart_prompt() {
        let loader = PromptLoader::embedded_only();
        let features = vec![Feature {
            id: "user-auth".to_string(),
            name: "User Authentication".to_string(),
            description: "Login and signup".to_string(),
        }];
        let ctx = PromptContext::from_transcript(&[Message::user("A fitness app")]).with_features(&features);

        let rendered = loader.render("flowchart", &ctx).unwrap();
        assert!(rendered.contains("user: A fitness app"));
        assert!(rendered.contains("- User Authentication: Login and signup"));
        assert!(rendered.contains("flowchart TD"));
    }

    #[test]
    fn test_render_feature_flowchart_prompt() {
        let loader = PromptLoader::embedded_only();
        let feature = Feature {
            id: "dashboard".to_string(),
            name: "User Dashboard".to_string(),
            description: "Key metrics at a glance".to_string(),
        };
        let ctx = PromptContext::default().with_feature(&feature);

        let rendered = loader.render("feature-flowchart", &ctx).unwrap();
        assert!(rendered.contains("User Dashboard"));
        assert!(rendered.contains("Key metrics at a glance"));
        // No transcript section when the transcript is empty
        assert!(!rendered.contains("Conversation context:"));
    }

    #[test]
    fn test_user_override_wins() {
        let temp = tempfile::TempDir::new().unwrap();
        let override_dir = temp.path().join(".precode/prompts");
        std::fs::create_dir_all(&override_dir).unwrap();
        std::fs::write(override_dir.join("brainstorm.pmt"), "custom {{transcript}}").unwrap();

        let loader = PromptLoader::new(temp.path());
        let ctx = PromptContext::from_transcript(&[Message::user("hi")]);
        let rendered = loader.render("brainstorm", &ctx).unwrap();
        assert_eq!(rendered, "custom user: hi");
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let result = loader.load_template("nonexistent-template");
        assert!(result.is_err());
    }
}
