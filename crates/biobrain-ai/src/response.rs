//! Parsing of the extraction service's reply.

use biobrain_core::ExtractedMetadata;
use serde_json::Value;

use crate::error::{AiError, Result};

/// Parses the JSON reply of the metadata extractor.
///
/// A reply wrapped in a Markdown code fence is unwrapped first. An `error`
/// key, malformed JSON, or anything that is not an object is an
/// [`AiError::Response`]; the caller leaves its form as it was.
pub fn parse_extraction_reply(reply: &str) -> Result<ExtractedMetadata> {
    let body = strip_code_fence(reply);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AiError::Response(format!("malformed JSON in reply: {e}")))?;

    let object = match value {
        Value::Object(map) => map,
        // Some models wrap the object in a one-element list.
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => {
            match items.pop() {
                Some(Value::Object(map)) => map,
                _ => return Err(AiError::Response("expected a JSON object".to_string())),
            }
        }
        other => {
            return Err(AiError::Response(format!(
                "expected a JSON object, got {}",
                type_name(&other)
            )));
        }
    };

    if let Some(err) = object.get("error") {
        let message = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(AiError::Response(message));
    }

    serde_json::from_value(Value::Object(object))
        .map_err(|e| AiError::Response(format!("unexpected field shape: {e}")))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop an info string such as `json`
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
