//! Feature offers: typed model, loose parsing, fixed fallback
//!
//! The generation service is asked for a JSON feature list but is never
//! trusted to produce one: parse loosely, validate, and fall back to the
//! fixed list on any failure.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A feature offered for selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feature {
    /// Unique per session
    pub id: String,
    pub name: String,
    pub description: String,
}

/// The fixed feature list used when personalized generation fails
pub fn fallback_features() -> Vec<Feature> {
    let entries = [
        (
            "user-auth",
            "User Authentication",
            "Secure user registration, login, and profile management system",
        ),
        (
            "dashboard",
            "User Dashboard",
            "Personalized dashboard showing key metrics and user data",
        ),
        (
            "notifications",
            "Push Notifications",
            "Real-time notifications to keep users engaged",
        ),
        (
            "analytics",
            "Analytics & Insights",
            "Track user behavior and app performance metrics",
        ),
        (
            "payment",
            "Payment Integration",
            "Secure payment processing and subscription management",
        ),
        (
            "social-sharing",
            "Social Sharing",
            "Share content and achievements on social platforms",
        ),
        (
            "search",
            "Advanced Search",
            "Powerful search functionality with filters and suggestions",
        ),
        (
            "messaging",
            "In-App Messaging",
            "Real-time chat and communication features",
        ),
    ];

    entries
        .iter()
        .map(|(id, name, description)| Feature {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

/// Wire shape for loose parsing - every field defaulted
#[derive(Debug, Deserialize)]
struct LooseFeature {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
}

/// Extract a validated feature list from raw service output
///
/// Strips code fences, locates the outermost JSON array, and keeps only
/// entries with a non-empty id and name, dropping duplicate ids. Returns
/// `None` when nothing usable survives; callers fall back to
/// [`fallback_features`].
pub fn parse_features(raw: &str) -> Option<Vec<Feature>> {
    let stripped = raw.replace("```json", "").replace("```", "");
    let stripped = stripped.trim();

    let start = stripped.find('[')?;
    let end = stripped.rfind(']')?;
    if end <= start {
        return None;
    }

    let loose: Vec<LooseFeature> = match serde_json::from_str(&stripped[start..=end]) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "parse_features: not a JSON array");
            return None;
        }
    };

    let mut seen = HashSet::new();
    let features: Vec<Feature> = loose
        .into_iter()
        .filter(|f| !f.id.trim().is_empty() && !f.name.trim().is_empty())
        .filter(|f| seen.insert(f.id.clone()))
        .map(|f| Feature {
            id: f.id,
            name: f.name,
            description: f.description,
        })
        .collect();

    if features.is_empty() {
        debug!("parse_features: no valid entries");
        None
    } else {
        Some(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_features_shape() {
        let features = fallback_features();
        assert_eq!(features.len(), 8);
        assert!(features.iter().any(|f| f.id == "user-auth"));
        // Ids unique
        let ids: HashSet<_> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), features.len());
    }

    #[test]
    fn test_parse_clean_json() {
        let raw = r#"[{"id": "a", "name": "A", "description": "first"}]"#;
        let features = parse_features(raw).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "a");
    }

    #[test]
    fn test_parse_fenced_json_with_chatter() {
        let raw = "Here you go!\n```json\n[{\"id\": \"a\", \"name\": \"A\", \"description\": \"d\"}]\n```\nEnjoy!";
        let features = parse_features(raw).unwrap();
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn test_parse_drops_invalid_and_duplicate_entries() {
        let raw = r#"[
            {"id": "a", "name": "A", "description": "keep"},
            {"id": "", "name": "No Id"},
            {"name": "Missing Id"},
            {"id": "a", "name": "Duplicate", "description": "drop"},
            {"id": "b", "name": "B"}
        ]"#;
        let features = parse_features(raw).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].description, "keep");
        assert_eq!(features[1].id, "b");
        assert_eq!(features[1].description, "");
    }

    #[test]
    fn test_parse_prose_returns_none() {
        assert!(parse_features("I could not generate features, sorry!").is_none());
    }

    #[test]
    fn test_parse_empty_array_returns_none() {
        assert!(parse_features("[]").is_none());
    }

    #[test]
    fn test_parse_malformed_json_returns_none() {
        assert!(parse_features("[{\"id\": \"a\", ").is_none());
    }
}
