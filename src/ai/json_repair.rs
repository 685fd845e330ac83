//! Best-effort recovery of JSON from model completions.
//!
//! Completions are not guaranteed to be valid JSON: models wrap the payload
//! in prose or code fences, substitute typographic quotes and leave trailing
//! commas behind. Everything here is total: callers always get a value back.

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Parses a completion into a JSON value, repairing common defects.
///
/// Returns an empty object when nothing parseable can be recovered.
pub fn normalize(raw: &str) -> Value {
    let stripped = strip_code_fences(raw.trim());

    if let Ok(value) = serde_json::from_str::<Value>(&stripped) {
        return value;
    }

    let cleaned = clean(&stripped);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return value;
    }

    debug!("Completion is not valid JSON, trying the outermost object span");

    if let Some(span) = outer_object_span(&cleaned) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            return value;
        }
    }

    warn!(
        "Failed to parse JSON from AI response: {}",
        cleaned.chars().take(120).collect::<String>()
    );
    Value::Object(Map::new())
}

/// What to return when a completion that should be a JSON array is not one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Fall back to a single-element array holding the raw completion text.
    WrapRaw,
    /// Fall back to an empty array.
    Empty,
}

/// Parses a completion that is expected to be a JSON array.
pub fn coerce_array(raw: &str, fallback: Coercion) -> Vec<Value> {
    let stripped = strip_code_fences(raw.trim());
    let parsed = serde_json::from_str::<Value>(&stripped)
        .or_else(|_| serde_json::from_str::<Value>(&clean(&stripped)));

    match parsed {
        Ok(Value::Array(items)) => items,
        Ok(_) | Err(_) => {
            debug!("Completion is not a JSON array, applying {:?} fallback", fallback);
            match fallback {
                Coercion::WrapRaw => vec![Value::String(raw.to_string())],
                Coercion::Empty => Vec::new(),
            }
        }
    }
}

/// Quote normalization followed by trailing comma removal.
fn clean(s: &str) -> String {
    remove_trailing_commas(&normalize_quotes(s))
}

fn normalize_quotes(s: &str) -> String {
    s.chars()
        .map(|ch| match ch {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Drops every comma outside a string literal whose next non-whitespace
/// character closes an object or array.
fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        result.push(ch);
    }

    result
}

fn strip_code_fences(s: &str) -> String {
    let mut result = s;

    if result.starts_with("```") {
        result = match result.find('\n') {
            Some(newline) => &result[newline + 1..],
            None => result.trim_start_matches('`'),
        };
    }

    result.trim_end().trim_end_matches("```").trim().to_string()
}

/// Greedy span from the first `{` to the last `}`.
fn outer_object_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}
