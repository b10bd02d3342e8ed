//! Step-suggestion tag parsing
//!
//! The brainstorming prompt instructs the model to end its reply with a
//! `[SUGGEST_STEP:<step>]` tag when it thinks the conversation is ready to
//! move on. The tag is advisory: it is stripped from the visible reply and
//! surfaced to the wizard, which decides whether to offer the transition.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::WizardStep;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[SUGGEST_STEP:(brainstorming|vision-mission|feature-selection|diagram)\]").unwrap());

static TAG_CI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[SUGGEST_STEP:(brainstorming|vision-mission|feature-selection|diagram)\]").unwrap()
});

/// Split a generated reply into visible text and an optional step suggestion
///
/// Only known step names match; an unrecognized tag is left in the text
/// untouched. Case sensitivity of the match is a config knob because
/// iterations of the product disagreed on it.
pub fn parse_step_suggestion(text: &str, case_insensitive: bool) -> (String, Option<WizardStep>) {
    let regex: &Regex = if case_insensitive { &TAG_CI } else { &TAG };

    let Some(captures) = regex.captures(text) else {
        return (text.trim().to_string(), None);
    };

    let step = WizardStep::parse(&captures[1].to_lowercase());
    let cleaned = regex.replace(text, "").trim().to_string();
    debug!(?step, "parse_step_suggestion: tag found");

    (cleaned, step)
}
