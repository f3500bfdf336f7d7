//! # Routing Policy
//!
//! Decides whether an extracted text deserves a reply. A policy is an ordered
//! list of [`RoutingRule`]s; the first rule that returns a decision wins. The
//! built-in layouts are selected with [`RoutingMode`]:
//!
//! - `layered`: marker > greeting, anything else gets the default acknowledgment
//!   without reaching the completion backend
//! - `marker`: only texts carrying the routing marker are accepted, marker stripped
//! - `greeting`: only texts containing a greeting word are accepted, unchanged

use crate::consts;
use anyhow::{Context, bail};
use regex::Regex;
use std::{fmt, str::FromStr};

/// Which rule produced an accepted decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedRule {
    Marker,
    Greeting,
}

impl MatchedRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedRule::Marker => "marker",
            MatchedRule::Greeting => "greeting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing usable was extracted from the payload
    NoText,
    /// The marker matched but nothing was left once it was stripped
    MarkerOnly,
    /// Text was present but no rule of the policy accepted it
    NoRuleMatched,
    /// No gate matched, answered with the default acknowledgment
    Acknowledged,
}

/// Text accepted for a reply. Never empty, never padded with whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedText {
    forward_text: String,
    rule: MatchedRule,
}

impl AcceptedText {
    /// Returns `None` when `text` is blank
    pub fn new(text: &str, rule: MatchedRule) -> Option<Self> {
        let forward_text = text.trim();
        if forward_text.is_empty() {
            return None;
        }

        Some(Self {
            forward_text: forward_text.to_string(),
            rule,
        })
    }

    pub fn forward_text(&self) -> &str {
        &self.forward_text
    }

    pub fn rule(&self) -> MatchedRule {
        self.rule
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Ignored(IgnoreReason),
    Accepted(AcceptedText),
}

impl RoutingDecision {
    pub fn is_ignored(&self) -> bool {
        matches!(self, RoutingDecision::Ignored(_))
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingDecision::Ignored(reason) => write!(f, "ignored ({reason:?})"),
            RoutingDecision::Accepted(accepted) => {
                write!(f, "accepted by {} rule", accepted.rule.as_str())
            }
        }
    }
}

/// A single gate of the routing policy.
///
/// `apply` receives non-blank text and returns `None` to let the next rule decide.
pub trait RoutingRule: Send + Sync {
    fn apply(&self, text: &str) -> Option<RoutingDecision>;
}

/// Accepts texts carrying the marker token, forwarding them without it.
///
/// Matching is case-insensitive and anchored on word boundaries, so with
/// `#test` the text `#testing` is not a match.
pub struct MarkerRule {
    pattern: Regex,
}

impl MarkerRule {
    pub fn new(marker: &str) -> anyhow::Result<Self> {
        let marker = marker.trim();
        if marker.is_empty() {
            bail!("routing marker can't be empty");
        }

        let trailing_boundary = match marker.chars().last() {
            Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
            _ => "",
        };
        // blanks after the marker go with it, the gap closes on the left side
        let pattern = Regex::new(&format!(
            r"(?i)(^|[^\w]){}{trailing_boundary}[ \t]*",
            regex::escape(marker)
        ))
        .with_context(|| format!("invalid routing marker: {marker}"))?;

        Ok(Self { pattern })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Removes every occurrence of the marker, the rest of the text is kept as is
    pub fn strip(&self, text: &str) -> String {
        let mut stripped = text.to_string();
        // adjacent markers share a boundary char, so one pass may leave some behind
        while self.pattern.is_match(&stripped) {
            stripped = self.pattern.replace_all(&stripped, "${1}").into_owned();
        }

        stripped.trim().to_string()
    }
}

impl RoutingRule for MarkerRule {
    fn apply(&self, text: &str) -> Option<RoutingDecision> {
        if !self.matches(text) {
            return None;
        }

        let decision = match AcceptedText::new(&self.strip(text), MatchedRule::Marker) {
            Some(accepted) => RoutingDecision::Accepted(accepted),
            None => RoutingDecision::Ignored(IgnoreReason::MarkerOnly),
        };
        Some(decision)
    }
}

/// Accepts texts containing one of [`consts::GREETING_WORDS`], unchanged
pub struct GreetingRule {
    pattern: Regex,
}

impl GreetingRule {
    pub fn new() -> anyhow::Result<Self> {
        let words = consts::GREETING_WORDS
            .iter()
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            pattern: Regex::new(&format!(r"(?i)\b(?:{words})\b"))?,
        })
    }
}

impl RoutingRule for GreetingRule {
    fn apply(&self, text: &str) -> Option<RoutingDecision> {
        if !self.pattern.is_match(text) {
            return None;
        }

        AcceptedText::new(text, MatchedRule::Greeting).map(RoutingDecision::Accepted)
    }
}

/// Last rule of the layered policy: acknowledges any text, forwards nothing
pub struct AcknowledgeRule;

impl RoutingRule for AcknowledgeRule {
    fn apply(&self, _text: &str) -> Option<RoutingDecision> {
        Some(RoutingDecision::Ignored(IgnoreReason::Acknowledged))
    }
}

/// Built-in rule layouts, selected once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoutingMode {
    #[default]
    Layered,
    Marker,
    Greeting,
}

impl FromStr for RoutingMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "layered" => Ok(RoutingMode::Layered),
            "marker" | "marker-gate" => Ok(RoutingMode::Marker),
            "greeting" => Ok(RoutingMode::Greeting),
            other => bail!("unknown routing mode: {other}"),
        }
    }
}

/// Ordered rule list, shared read-only by every request
pub struct RoutingPolicy {
    rules: Vec<Box<dyn RoutingRule>>,
}

impl RoutingPolicy {
    pub fn with_rules(rules: Vec<Box<dyn RoutingRule>>) -> Self {
        Self { rules }
    }

    pub fn from_mode(mode: RoutingMode, marker: &str) -> anyhow::Result<Self> {
        let rules: Vec<Box<dyn RoutingRule>> = match mode {
            RoutingMode::Layered => vec![
                Box::new(MarkerRule::new(marker)?),
                Box::new(GreetingRule::new()?),
                Box::new(AcknowledgeRule),
            ],
            RoutingMode::Marker => vec![Box::new(MarkerRule::new(marker)?)],
            RoutingMode::Greeting => vec![Box::new(GreetingRule::new()?)],
        };

        Ok(Self::with_rules(rules))
    }

    pub fn classify(&self, text: Option<&str>) -> RoutingDecision {
        let Some(text) = text.map(str::trim).filter(|text| !text.is_empty()) else {
            return RoutingDecision::Ignored(IgnoreReason::NoText);
        };

        self.rules
            .iter()
            .find_map(|rule| rule.apply(text))
            .unwrap_or(RoutingDecision::Ignored(IgnoreReason::NoRuleMatched))
    }
}
