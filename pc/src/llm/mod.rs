//! Generation service client module
//!
//! Provides the generation-service boundary: a single request carries a system
//! instruction plus ordered role/text pairs, and the response is an
//! unstructured text blob that downstream code repairs.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::GenerationClient;
pub use error::GenerationError;
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, TokenUsage};

use crate::config::GenerationConfig;

/// Create a generation client based on the provider specified in config
///
/// The model identifier is configuration, never fixed behavior - iterations
/// of the product swapped models silently, so it must stay a config knob.
pub fn create_client(config: &GenerationConfig) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_config(config)?)),
        other => Err(GenerationError::InvalidResponse(format!(
            "Unknown generation provider: '{}'. Supported: gemini",
            other
        ))),
    }
}
