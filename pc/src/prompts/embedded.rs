//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Brainstorming-step system instruction
pub const BRAINSTORM: &str = include_str!("../../prompts/brainstorm.pmt");

/// Vision/mission refinement instruction
pub const VISION: &str = include_str!("../../prompts/vision.pmt");

/// Personalized feature-list generator prompt
pub const FEATURES: &str = include_str!("../../prompts/features.pmt");

/// Master app flowchart prompt
pub const FLOWCHART: &str = include_str!("../../prompts/flowchart.pmt");

/// Single-feature micro-flow prompt
pub const FEATURE_FLOWCHART: &str = include_str!("../../prompts/feature-flowchart.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "brainstorm" => Some(BRAINSTORM),
        "vision" => Some(VISION),
        "features" => Some(FEATURES),
        "flowchart" => Some(FLOWCHART),
        "feature-flowchart" => Some(FEATURE_FLOWCHART),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_brainstorm() {
        let prompt = get_embedded("brainstorm").unwrap();
        assert!(prompt.contains("product strategist"));
        assert!(prompt.contains("SUGGEST_STEP"));
    }

    #[test]
    fn test_get_embedded_flowchart() {
        let prompt = get_embedded("flowchart").unwrap();
        assert!(prompt.contains("flowchart TD"));
        assert!(prompt.contains("NO quotes"));
    }

    #[test]
    fn test_get_embedded_features_demands_json() {
        let prompt = get_embedded("features").unwrap();
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
