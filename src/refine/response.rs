//! Parsing entry lists out of free-form completion text.
//!
//! Completions are asked for a bare JSON array but commonly arrive wrapped in
//! a markdown fence, prefixed with prose, or as `{"entries": [...]}`. Parsing
//! tries, in order: the whole text, the contents of the first code fence, and
//! the span from the first `[` to the last `]`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::RefineError;
use crate::model::ScheduleEntry;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*\n?(.*?)```").unwrap());

/// Extract entries from a completion.
pub fn parse_entries(content: &str) -> Result<Vec<ScheduleEntry>, RefineError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(RefineError::EmptyResponse);
    }

    let fenced = CODE_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim());
    let bracketed = match (content.find('['), content.rfind(']')) {
        (Some(open), Some(close)) if open < close => Some(&content[open..=close]),
        _ => None,
    };

    let array = [Some(content), fenced, bracketed]
        .into_iter()
        .flatten()
        .find_map(entry_array)
        .ok_or_else(|| RefineError::Parse("no JSON array of entries in completion".to_string()))?;

    Ok(array.iter().filter_map(entry_from_value).collect())
}

/// Parse `text` as a JSON array, or an object carrying one under `entries`.
fn entry_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("entries")? {
            Value::Array(items) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn entry_from_value(value: &Value) -> Option<ScheduleEntry> {
    let object = value.as_object()?;
    let field = |keys: &[&str]| -> String {
        keys.iter()
            .find_map(|key| match object.get(*key)? {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_default()
    };

    Some(ScheduleEntry {
        day: field(&["day"]),
        start_time: field(&["start_time", "startTime", "start"]),
        end_time: field(&["end_time", "endTime", "end"]),
        subject: field(&["subject", "course"]),
        teacher: field(&["teacher", "instructor"]),
        room: field(&["room"]),
        block: field(&["block"]),
        class_name: field(&["class_name", "className", "class", "section"]),
    })
}
