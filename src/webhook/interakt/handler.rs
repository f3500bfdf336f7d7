//! # Interakt Webhook Handler
//!
//! Runs one delivery through extraction, routing and reply composition and
//! turns the result into the response envelope. Nothing here fails the
//! request: unknown shapes are ignored, backend failures become fallback
//! replies and panics are caught and acknowledged.

use super::{
    composer::{ReplyComposer, ReplyResult},
    extractor,
    routing::{RoutingDecision, RoutingPolicy},
    schemas::WebhookResponse,
};
use crate::metric;
use futures::FutureExt;
use serde_json::Value;
use std::{any::Any, panic::AssertUnwindSafe};

/// Result of processing one delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookOutcome {
    /// Candidate path the text was read from
    pub candidate: Option<&'static str>,
    pub decision: RoutingDecision,
    pub reply: ReplyResult,
}

impl WebhookOutcome {
    fn metric_label(&self) -> &'static str {
        if self.decision.is_ignored() {
            return "ignored";
        }
        self.reply.kind()
    }
}

/// Extracts, classifies and composes the reply for `event`
pub async fn process_event(
    event: &Value,
    policy: &RoutingPolicy,
    composer: &ReplyComposer,
) -> WebhookOutcome {
    let extracted = extractor::extract(event);
    match extracted {
        Some(found) => logfire::info!(
            "Extracted user text from {candidate}: {text}",
            candidate = found.candidate,
            text = found.text.to_string()
        ),
        None => logfire::info!("No user text found in payload"),
    }

    let decision = policy.classify(extracted.map(|found| found.text));
    logfire::info!("Routing decision: {decision}", decision = decision.to_string());

    let reply = composer.compose(&decision).await;
    if let ReplyResult::Failed(reason) = &reply {
        logfire::error!(
            "Completion backend failed, answering with fallback: {reason}",
            reason = reason.clone()
        );
    }

    let outcome = WebhookOutcome {
        candidate: extracted.map(|found| found.candidate),
        decision,
        reply,
    };
    metric::incr_webhook_outcome_statds(outcome.metric_label());

    outcome
}

/// [`process_event`] behind a panic boundary, always producing an envelope
pub async fn respond(
    event: &Value,
    policy: &RoutingPolicy,
    composer: &ReplyComposer,
) -> WebhookResponse {
    match AssertUnwindSafe(process_event(event, policy, composer))
        .catch_unwind()
        .await
    {
        Ok(outcome) => {
            WebhookResponse::from_reply(&outcome.reply, outcome.decision.is_ignored())
        }
        Err(panic) => {
            logfire::error!(
                "Webhook pipeline panicked: {error}",
                error = panic_message(panic.as_ref())
            );
            metric::incr_webhook_outcome_statds("fault");
            WebhookResponse::internal_fault()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        return message.to_string();
    }
    if let Some(message) = panic.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}
