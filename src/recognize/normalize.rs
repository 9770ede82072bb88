//! Turns heterogeneous backend replies into plain text.
//!
//! Extractors are tried in priority order; the first one that finds its
//! field wins, even if the text it finds is empty. A reply no extractor
//! understands is logged and becomes `""`, never an error.

use crate::engine::EngineReply;
use serde_json::Value;

type Extractor = fn(&Value) -> Option<String>;

/// Extractors in priority order, named for logging.
pub const REPLY_EXTRACTORS: [(&str, Extractor); 4] = [
    ("label", top_level_label),
    ("text.label", nested_text_label),
    ("result.textLines", text_lines),
    ("words", words),
];

pub fn normalize_reply(reply: EngineReply) -> String {
    match reply {
        EngineReply::Text(text) => text,
        EngineReply::Json(json) => extract_text(&json).unwrap_or_else(|| {
            log::warn!(
                "[RECOGNIZE] Unrecognized reply shape (keys: {}) — treating as no text",
                describe_keys(&json)
            );
            String::new()
        }),
        EngineReply::Unparsed(body) => {
            log::warn!(
                "[RECOGNIZE] Unparseable reply ({} bytes) — treating as no text",
                body.len()
            );
            String::new()
        }
    }
}

/// First successful extractor's text, if any.
pub fn extract_text(json: &Value) -> Option<String> {
    REPLY_EXTRACTORS.iter().find_map(|(name, extract)| {
        let text = extract(json)?;
        log::debug!("[RECOGNIZE] Reply matched '{}' extractor", name);
        Some(text)
    })
}

fn top_level_label(json: &Value) -> Option<String> {
    json.get("label")?.as_str().map(str::to_string)
}

fn nested_text_label(json: &Value) -> Option<String> {
    json.get("text")?.get("label")?.as_str().map(str::to_string)
}

fn text_lines(json: &Value) -> Option<String> {
    let lines = json.get("result")?.get("textLines")?.as_array()?;
    Some(join_labels(lines, "\n"))
}

fn words(json: &Value) -> Option<String> {
    let words = json.get("words")?.as_array()?;
    Some(join_labels(words, " "))
}

fn join_labels(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .filter_map(|item| item.get("label").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(separator)
}

fn describe_keys(json: &Value) -> String {
    match json.as_object() {
        Some(map) if !map.is_empty() => map.keys().cloned().collect::<Vec<_>>().join(", "),
        Some(_) => "empty object".to_string(),
        None => format!("not an object: {}", type_name(json)),
    }
}

fn type_name(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
