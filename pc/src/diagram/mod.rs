//! Diagram text normalization and rendering
//!
//! The generation service is asked for flowchart markup but is not
//! contractually bound to produce any. This module repairs whatever comes
//! back into the strict line-oriented grammar the renderer accepts, and
//! adapts an external renderer behind a trait.

mod normalizer;
mod renderer;

pub use normalizer::{DECLARATION, normalize};
pub use renderer::{DiagramRenderer, MmdcRenderer, RenderError};

use serde::{Deserialize, Serialize};

/// A generated diagram: the raw service output and its repaired form
///
/// Regenerated on every diagram request; only `normalized_text` is persisted,
/// as part of the owning session record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagramDocument {
    /// Whatever the generation service returned
    pub raw_text: String,

    /// Repaired markup satisfying the flowchart grammar (best effort)
    pub normalized_text: String,
}

impl DiagramDocument {
    /// Build a document by normalizing raw service output
    pub fn from_raw(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let normalized_text = normalize(&raw_text);
        Self {
            raw_text,
            normalized_text,
        }
    }
}
