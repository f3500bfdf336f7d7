//! # Interakt Webhook Response Schema
//!
//! Interakt only needs an acknowledgment, so every semantically valid delivery
//! is answered with 200 and this envelope. What actually happened is told by
//! the optional fields and by the logs, never by the status code.

use super::composer::ReplyResult;
use serde::{Deserialize, Serialize};

/// JSON envelope returned for every processed delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    /// Set when the routing policy ignored the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    /// Set when the reply is a fallback: "completion_failed" or "internal_error"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    pub fn from_reply(reply: &ReplyResult, ignored: bool) -> Self {
        Self {
            ok: true,
            reply: Some(reply.reply_text().to_string()),
            ignored: ignored.then_some(true),
            error: matches!(reply, ReplyResult::Failed(_)).then(|| "completion_failed".to_string()),
        }
    }

    /// Acknowledgment used when the pipeline itself broke
    pub fn internal_fault() -> Self {
        Self {
            ok: true,
            reply: Some(crate::consts::REPLY_INTERNAL_FAULT.to_string()),
            ignored: None,
            error: Some("internal_error".to_string()),
        }
    }
}
