//! Plan ingestion from planning-service output.
//!
//! The planning service is an LLM. Its replies usually hold the plan as JSON,
//! but sometimes wrapped in a markdown fence or surrounded by prose, and now
//! and then with single-quoted strings, bare keys, or trailing commas.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{CourseError, Result};
use crate::model::Plan;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*([^`]+?)\s*```").expect("fence pattern is valid"));

static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").expect("bare key pattern is valid")
});

static SINGLE_QUOTED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'([^'"]*)'\s*:"#).expect("single-quoted key pattern is valid")
});

static SINGLE_QUOTED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":\s*'([^'"]*)'(\s*[,}\]])"#).expect("single-quoted value pattern is valid")
});

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern is valid"));

/// Pulls the JSON payload out of free-form text.
///
/// Tries, in order: the first ```` ```json ```` fenced block, the first
/// balanced top-level `{...}` object, the trimmed text itself.
pub fn extract_json(text: &str) -> &str {
    if let Some(body) = JSON_FENCE.captures(text).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }

    if let Some(object) = outermost_object(text) {
        return object;
    }

    text.trim()
}

/// Parses a plan out of planning-service text.
///
/// A first parse failure is retried once on the [`repair_json`] output.
/// If that fails too, every balanced `{...}` span in the text is tried in
/// turn and the first one holding chapters wins. Anything still unparseable
/// is a malformed plan.
pub fn parse_plan(text: &str) -> Result<Plan> {
    let json = extract_json(text);

    let first = match serde_json::from_str(json) {
        Ok(plan) => return Ok(plan),
        Err(e) => e,
    };
    debug!(error = %first, "plan JSON invalid, attempting repair");

    if let Ok(plan) = serde_json::from_str(&repair_json(json)) {
        return Ok(plan);
    }

    embedded_objects(text)
        .filter_map(|object| serde_json::from_str::<Plan>(object).ok())
        .find(|plan| !plan.chapters.is_empty())
        .ok_or_else(|| CourseError::MalformedPlan(format!("invalid JSON: {first}")))
}

/// Rewrites the usual LLM slips into valid JSON.
///
/// Quotes bare property names and turns single-quoted keys and values into
/// double-quoted ones. Apostrophes inside double-quoted strings are left
/// alone. Trailing commas before `}` or `]` are dropped.
pub fn repair_json(text: &str) -> String {
    let text = SINGLE_QUOTED_KEY.replace_all(text, "\"$1\":");
    let text = SINGLE_QUOTED_VALUE.replace_all(&text, ":\"$1\"$2");
    let text = BARE_KEY.replace_all(&text, "$1\"$2\":");
    TRAILING_COMMA.replace_all(&text, "$1").into_owned()
}

/// Every balanced `{...}` span, one per opening brace, outermost first.
fn embedded_objects(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .filter_map(|(i, _)| outermost_object(&text[i..]))
}

/// The first balanced `{...}` span, ignoring braces inside strings.
fn outermost_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| &text[s..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
