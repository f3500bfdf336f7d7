//! Turns the raw webhook body into a JSON value.
//!
//! Interakt declares `application/json`, but deliveries have been seen with
//! other content types, form-encoded bodies and JSON serialized twice. The body
//! is reinterpreted best-effort; only bytes that fit none of these shapes are
//! rejected.

use super::errors::WebhookError;
use serde_json::{Map, Value};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parses `body` into a structured value, whatever `content_type` claims
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, WebhookError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return Ok(unwrap_encoded_json(value));
    }

    let declared_form = content_type
        .map(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false);
    if declared_form || looks_like_form(body) {
        if let Some(value) = parse_form(body) {
            return Ok(value);
        }
    }

    Err(WebhookError::MalformedBody(format!(
        "body of {} bytes is neither JSON nor form data (content-type: {})",
        body.len(),
        content_type.unwrap_or("none")
    )))
}

/// A JSON string holding JSON is decoded once more
fn unwrap_encoded_json(value: Value) -> Value {
    match &value {
        Value::String(inner) => match serde_json::from_str::<Value>(inner) {
            Ok(decoded @ (Value::Object(_) | Value::Array(_))) => decoded,
            _ => value,
        },
        _ => value,
    }
}

fn looks_like_form(body: &[u8]) -> bool {
    std::str::from_utf8(body)
        .map(|text| text.contains('=') && !text.trim_start().starts_with(['{', '[']))
        .unwrap_or(false)
}

/// Decodes `a=1&b=2` into an object. Values that are JSON documents are
/// embedded as structured values.
fn parse_form(body: &[u8]) -> Option<Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
    if pairs.is_empty() {
        return None;
    }

    let fields = pairs
        .into_iter()
        .map(|(key, raw)| {
            let value = match serde_json::from_str::<Value>(&raw) {
                Ok(decoded @ (Value::Object(_) | Value::Array(_))) => decoded,
                _ => Value::String(raw),
            };
            (key, value)
        })
        .collect::<Map<String, Value>>();

    Some(Value::Object(fields))
}
