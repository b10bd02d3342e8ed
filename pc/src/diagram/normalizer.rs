//! Diagram text normalizer
//!
//! Transforms free-form text that is supposed to contain a flowchart
//! description into text that strictly satisfies the grammar:
//!
//! - Line 1 starts with the `flowchart` declaration keyword.
//! - Every other line is a node declaration (`ID[label]`, `ID{label}` or
//!   `ID(label)` with `ID` matching `[A-Z][0-9]*` and a quote-free label) or
//!   an edge declaration (`ID --> ID`, optionally `|label|` annotated).
//! - No blank lines, no fenced code-block delimiters.
//!
//! The repair is deterministic, single pass, and idempotent: running it over
//! its own output is a no-op. It never fails - when every line is discarded
//! the result is the lone declaration line, an empty but valid graph.

use regex::Regex;
use std::sync::LazyLock;

/// Synthesized first line when the service omits the declaration
pub const DECLARATION: &str = "flowchart TD";

/// Quote characters the grammar forbids inside labels
const QUOTES: [char; 6] = ['"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PIPE_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|\s*([^|]*?)\s*\|").unwrap());
static ID_BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z][0-9]*)\s*([\[{(])").unwrap());
static NODE_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][0-9]*[\[{(]").unwrap());

/// Repair loosely-structured generated text into strict flowchart markup
pub fn normalize(raw: &str) -> String {
    // Fenced delimiters can appear anywhere, including mid-line
    let stripped = raw.replace("```mermaid", "").replace("```", "");
    let stripped = stripped.trim();

    let lines: Vec<&str> = stripped.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut out: Vec<String> = Vec::new();

    if lines.first().is_none_or(|l| !l.starts_with("flowchart")) {
        out.push(DECLARATION.to_string());
    }

    for line in lines {
        if line.starts_with("flowchart") {
            // Only line 1 may carry the declaration; later ones are neither
            // nodes nor edges and get dropped like any other invalid line
            if out.is_empty() {
                out.push(line.to_string());
            }
            continue;
        }

        let repaired = repair_line(line);
        if repaired.contains("-->") || NODE_SHAPE.is_match(&repaired) {
            out.push(repaired);
        }
    }

    out.join("\n")
}

/// Repair a single non-declaration line
///
/// Quote removal first, then spacing around the arrow, pipe labels and
/// ID/bracket pairs, then a whitespace collapse that also undoes any double
/// spacing the arrow respacing introduced. The collapse and the final
/// arrow-to-pipe tighten must come after the respacing or reapplication
/// would not be a no-op.
fn repair_line(line: &str) -> String {
    let unquoted: String = line.chars().filter(|c| !QUOTES.contains(c)).collect();
    let arrowed = unquoted.replace("-->", " --> ");
    let piped = PIPE_LABEL.replace_all(&arrowed, "|$1|");
    let bracketed = ID_BRACKET.replace_all(&piped, "$1$2");
    let collapsed = WHITESPACE.replace_all(&bracketed, " ");
    collapsed.trim().replace("--> |", "-->|")
}
