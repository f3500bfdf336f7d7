//! # Interakt Message Text Extraction
//!
//! Interakt does not commit to a single webhook schema: depending on the
//! integration version and message type the user's text shows up flat, under
//! `message`, inside a `messages` array or in the WhatsApp Cloud
//! `entry[].changes[].value` envelope. Every known location is declared once in
//! [`CANDIDATES`], ordered by priority, and evaluated by the generic resolver
//! in [`crate::utils`]. Supporting a new shape means adding a row there.

use crate::utils::{
    PathSegment::{self, Index, Key},
    try_resolve,
};
use serde_json::Value;

/// One place in a payload where the user's text may live
#[derive(Debug)]
pub struct ExtractionCandidate {
    /// Dotted form of the path, used in logs
    pub name: &'static str,
    pub path: &'static [PathSegment<'static>],
}

impl ExtractionCandidate {
    const fn new(name: &'static str, path: &'static [PathSegment<'static>]) -> Self {
        Self { name, path }
    }

    /// Returns the candidate's value when it is a string with visible content
    pub fn evaluate<'v>(&self, event: &'v Value) -> Option<&'v str> {
        try_resolve(event, self.path)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Text found in a payload together with the candidate that matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedText<'v> {
    pub candidate: &'static str,
    pub text: &'v str,
}

/// Every known text location, most specific first. Evaluation stops at the
/// first candidate holding a non-blank string.
pub static CANDIDATES: &[ExtractionCandidate] = &[
    ExtractionCandidate::new("text", &[Key("text")]),
    ExtractionCandidate::new("message.text.body", &[Key("message"), Key("text"), Key("body")]),
    ExtractionCandidate::new("message.text", &[Key("message"), Key("text")]),
    ExtractionCandidate::new("payload.text", &[Key("payload"), Key("text")]),
    ExtractionCandidate::new("payload.message", &[Key("payload"), Key("message")]),
    ExtractionCandidate::new(
        "messages.0.text.body",
        &[Key("messages"), Index(0), Key("text"), Key("body")],
    ),
    ExtractionCandidate::new("messages.0.text", &[Key("messages"), Index(0), Key("text")]),
    ExtractionCandidate::new("data.message.text", &[Key("data"), Key("message"), Key("text")]),
    ExtractionCandidate::new("data.message", &[Key("data"), Key("message")]),
    ExtractionCandidate::new(
        "data.messages.0.text.body",
        &[Key("data"), Key("messages"), Index(0), Key("text"), Key("body")],
    ),
    ExtractionCandidate::new(
        "data.messages.0.text",
        &[Key("data"), Key("messages"), Index(0), Key("text")],
    ),
    ExtractionCandidate::new(
        "entry.0.changes.0.value.messages.0.text.body",
        &[
            Key("entry"),
            Index(0),
            Key("changes"),
            Index(0),
            Key("value"),
            Key("messages"),
            Index(0),
            Key("text"),
            Key("body"),
        ],
    ),
    ExtractionCandidate::new(
        "entry.0.changes.0.value.messages.0.interactive.button_reply.title",
        &[
            Key("entry"),
            Index(0),
            Key("changes"),
            Index(0),
            Key("value"),
            Key("messages"),
            Index(0),
            Key("interactive"),
            Key("button_reply"),
            Key("title"),
        ],
    ),
    ExtractionCandidate::new(
        "entry.0.changes.0.value.messages.0.interactive.list_reply.title",
        &[
            Key("entry"),
            Index(0),
            Key("changes"),
            Index(0),
            Key("value"),
            Key("messages"),
            Index(0),
            Key("interactive"),
            Key("list_reply"),
            Key("title"),
        ],
    ),
    ExtractionCandidate::new(
        "entry.0.changes.0.value.messages.0.button.text",
        &[
            Key("entry"),
            Index(0),
            Key("changes"),
            Index(0),
            Key("value"),
            Key("messages"),
            Index(0),
            Key("button"),
            Key("text"),
        ],
    ),
    ExtractionCandidate::new("incoming_message", &[Key("incoming_message")]),
    ExtractionCandidate::new("message_text", &[Key("message_text")]),
    ExtractionCandidate::new("message", &[Key("message")]),
    ExtractionCandidate::new("Text", &[Key("Text")]),
    ExtractionCandidate::new("Body", &[Key("Body")]),
    ExtractionCandidate::new("body", &[Key("body")]),
    ExtractionCandidate::new("Message", &[Key("Message")]),
];

/// Finds the user's text using the built-in [`CANDIDATES`] table.
///
/// `None` means no candidate held a non-blank string; a blank field that was
/// present is never reported as found.
pub fn extract(event: &Value) -> Option<ExtractedText<'_>> {
    extract_with(event, CANDIDATES)
}

/// Same as [`extract`] with a caller-provided candidate table
pub fn extract_with<'v>(
    event: &'v Value,
    candidates: &[ExtractionCandidate],
) -> Option<ExtractedText<'v>> {
    candidates.iter().find_map(|candidate| {
        candidate.evaluate(event).map(|text| ExtractedText {
            candidate: candidate.name,
            text,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Builds a payload where only `path` is populated
    fn payload_at(path: &[PathSegment<'_>], leaf: Value) -> Value {
        path.iter().rev().fold(leaf, |inner, segment| match segment {
            Key(key) => {
                let mut fields = serde_json::Map::new();
                fields.insert(key.to_string(), inner);
                Value::Object(fields)
            }
            Index(index) => {
                let mut items = vec![Value::Null; *index];
                items.push(inner);
                Value::Array(items)
            }
        })
    }

    #[test]
    fn test_every_candidate_is_reachable_on_its_own() {
        for candidate in CANDIDATES {
            let payload = payload_at(candidate.path, json!("hola"));

            let extracted = extract(&payload);

            assert_eq!(
                extracted,
                Some(ExtractedText {
                    candidate: candidate.name,
                    text: "hola",
                }),
                "candidate {} did not match its own shape: {payload}",
                candidate.name
            );
        }
    }

    #[test]
    fn test_candidate_names_match_paths() {
        for candidate in CANDIDATES {
            assert_eq!(
                PathSegment::parse_dotted(candidate.name),
                candidate.path.to_vec()
            );
        }
    }

    #[test]
    fn test_no_text_found() {
        for payload in [
            json!({}),
            json!([]),
            json!(null),
            json!("text"),
            json!({"event": "delivered", "status": "read"}),
        ] {
            assert_eq!(extract(&payload), None, "payload {payload}");
        }
    }

    #[test]
    fn test_earlier_candidate_wins() {
        let payload = json!({
            "text": "flat",
            "message": {"text": "nested"},
        });

        let extracted = extract(&payload).unwrap();

        assert_eq!(extracted.text, "flat");
        assert_eq!(extracted.candidate, "text");
    }

    #[test]
    fn test_body_object_preferred_over_string_variant() {
        let payload = json!({"messages": [{"text": {"body": "#test please check"}}]});

        let extracted = extract(&payload).unwrap();

        assert_eq!(extracted.text, "#test please check");
        assert_eq!(extracted.candidate, "messages.0.text.body");
    }

    #[test]
    fn test_blank_and_non_string_values_are_skipped() {
        let payload = json!({
            "text": "   ",
            "message": {"text": 12},
            "payload": {"text": ["x"]},
            "data": {"message": "from data"},
        });

        assert_eq!(extract(&payload).unwrap().text, "from data");
    }

    #[test]
    fn test_malformed_intermediates_do_not_stop_evaluation() {
        let payload = json!({
            "messages": {"text": "messages is not an array"},
            "entry": "broken",
            "incoming_message": "still found",
        });

        let extracted = extract(&payload).unwrap();

        assert_eq!(extracted.text, "still found");
        assert_eq!(extracted.candidate, "incoming_message");
    }

    #[test]
    fn test_whatsapp_cloud_payload() {
        let payload = json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "123456",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "messages": [{
                            "from": "+9876543210",
                            "id": "msg123",
                            "type": "interactive",
                            "interactive": {
                                "type": "button_reply",
                                "button_reply": {"id": "yes", "title": "Yes please"}
                            }
                        }]
                    }
                }]
            }]
        });

        let extracted = extract(&payload).unwrap();

        assert_eq!(extracted.text, "Yes please");
        assert_eq!(
            extracted.candidate,
            "entry.0.changes.0.value.messages.0.interactive.button_reply.title"
        );
    }

    #[test]
    fn test_extract_with_custom_table() {
        static ONLY_CAPTION: &[ExtractionCandidate] = &[ExtractionCandidate::new(
            "image.caption",
            &[Key("image"), Key("caption")],
        )];
        let payload = json!({"text": "ignored", "image": {"caption": "a dog"}});

        assert_eq!(extract_with(&payload, ONLY_CAPTION).unwrap().text, "a dog");
    }
}
