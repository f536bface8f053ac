//! Structured-value extraction from generated text
//!
//! Generated text often wraps the JSON it was asked for in code fences or
//! chatty prose. Extraction runs an ordered list of strategies and stops at
//! the first one that yields a value:
//!
//! 1. [`ExtractStrategy::Direct`]: the trimmed text parses as-is
//! 2. [`ExtractStrategy::Fenced`]: the body of the first code fence parses
//! 3. [`ExtractStrategy::BraceMatched`]: from the first `{` to its matching `}`,
//!    falling back to the last `}` in the text

use crate::core::error::{AssistError, Result};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    Direct,
    Fenced,
    BraceMatched,
}

/// Strategies in the order they are tried
pub const STRATEGIES: [ExtractStrategy; 3] = [
    ExtractStrategy::Direct,
    ExtractStrategy::Fenced,
    ExtractStrategy::BraceMatched,
];

impl ExtractStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractStrategy::Direct => "direct",
            ExtractStrategy::Fenced => "fenced",
            ExtractStrategy::BraceMatched => "brace-matched",
        }
    }

    pub fn attempt(&self, text: &str) -> Option<Value> {
        match self {
            ExtractStrategy::Direct => serde_json::from_str(text.trim()).ok(),
            ExtractStrategy::Fenced => fenced_body(text).and_then(|body| serde_json::from_str(body).ok()),
            ExtractStrategy::BraceMatched => brace_matched(text),
        }
    }
}

/// Extract a JSON object from `text`
pub fn extract_structured(text: &str) -> Result<Value> {
    extract_matching(text, Value::is_object)
}

/// Extract any non-null JSON value from `text` (bare strings and numbers
/// included), for merges that target a single field
pub fn extract_value(text: &str) -> Result<Value> {
    extract_matching(text, |v| !v.is_null())
}

fn extract_matching(text: &str, accept: fn(&Value) -> bool) -> Result<Value> {
    for strategy in STRATEGIES {
        if let Some(value) = strategy.attempt(text).filter(accept) {
            tracing::debug!("Extracted generated content via {} strategy", strategy.name());
            return Ok(value);
        }
    }

    let preview: String = text.chars().take(80).collect();
    Err(AssistError::UnparsableResponse(format!(
        "no structured value found in {:?}",
        preview
    )))
}

/// Body of the first code fence, with an optional language tag dropped
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Language tag runs to the end of the opening line
    let body_start = after.find('\n').map_or(0, |nl| {
        let tag = &after[..nl];
        if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
            nl + 1
        } else {
            0
        }
    });
    let body = &after[body_start..];
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    Some(body.trim())
}

fn brace_matched(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let tail = &text[start..];

    if let Some(end) = matching_brace(tail) {
        if let Ok(value) = serde_json::from_str(&tail[..=end]) {
            return Some(value);
        }
    }

    let end = tail.rfind('}')?;
    serde_json::from_str(&tail[..=end]).ok()
}

/// Byte offset of the `}` closing the `{` at the start of `text`
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
