//! # Reply Composer
//!
//! Turns a routing decision into reply text. Ignored events and accepted ones
//! without a completion backend get canned replies; otherwise the forwarded
//! text is sent to the [`CompletionService`] under a timeout. Backend problems
//! end up as [`ReplyResult::Failed`], never as errors.

use super::routing::{IgnoreReason, MatchedRule, RoutingDecision};
use crate::{consts, services::ImplCompletionService};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyResult {
    Static(String),
    Generated(String),
    /// Diagnostic message, meant for logs only
    Failed(String),
}

impl ReplyResult {
    /// Text the upstream platform receives
    pub fn reply_text(&self) -> &str {
        match self {
            ReplyResult::Static(text) | ReplyResult::Generated(text) => text,
            ReplyResult::Failed(_) => consts::REPLY_COMPLETION_FALLBACK,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReplyResult::Static(_) => "static",
            ReplyResult::Generated(_) => "generated",
            ReplyResult::Failed(_) => "failed",
        }
    }
}

fn ignored_reply(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::NoText => consts::REPLY_IGNORED_NO_TEXT,
        IgnoreReason::MarkerOnly => consts::REPLY_IGNORED_MARKER_ONLY,
        IgnoreReason::NoRuleMatched => consts::REPLY_IGNORED_NO_MATCH,
        IgnoreReason::Acknowledged => consts::REPLY_DEFAULT_ACK,
    }
}

fn canned_reply(rule: MatchedRule) -> &'static str {
    match rule {
        MatchedRule::Marker => consts::REPLY_MARKER_ACK,
        MatchedRule::Greeting => consts::REPLY_GREETING,
    }
}

pub struct ReplyComposer {
    completion: Option<ImplCompletionService>,
    timeout: Duration,
}

impl ReplyComposer {
    pub fn new(completion: Option<ImplCompletionService>, timeout: Duration) -> Self {
        Self {
            completion,
            timeout,
        }
    }

    /// Composer answering only with canned replies
    #[cfg(test)]
    pub fn canned() -> Self {
        Self::new(None, Duration::from_secs(1))
    }

    pub fn has_backend(&self) -> bool {
        self.completion.is_some()
    }

    pub async fn compose(&self, decision: &RoutingDecision) -> ReplyResult {
        let accepted = match decision {
            RoutingDecision::Ignored(reason) => {
                return ReplyResult::Static(ignored_reply(*reason).to_string());
            }
            RoutingDecision::Accepted(accepted) => accepted,
        };

        let Some(completion) = &self.completion else {
            return ReplyResult::Static(canned_reply(accepted.rule()).to_string());
        };

        let completion_call = completion.complete_text(accepted.forward_text());
        match tokio::time::timeout(self.timeout, completion_call).await {
            Ok(Ok(content)) if !content.trim().is_empty() => {
                ReplyResult::Generated(content.trim().to_string())
            }
            Ok(Ok(_)) => ReplyResult::Failed("completion backend returned empty content".into()),
            Ok(Err(e)) => ReplyResult::Failed(format!("{e:#}")),
            Err(_) => ReplyResult::Failed(format!(
                "completion backend timed out after {} ms",
                self.timeout.as_millis()
            )),
        }
    }
}
