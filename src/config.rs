//! Application configuration management with security considerations.
//!
//! All values come from environment variables and are read exactly once, in
//! `main`. The webhook pipeline never touches [`APP_CONFIG`] directly: it gets
//! the derived [`WebhookSettings`], routing policy and reply composer injected
//! through [`crate::webhook::AppState`].
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged

use crate::webhook::interakt::{routing::RoutingMode, security::SignatureMode};
use envconfig::Envconfig;
use std::{sync::LazyLock, time::Duration};

/// Application configuration with security-aware field management.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    /// Hosting platforms inject it as `PORT`
    #[envconfig(from = "PORT", default = "10000")]
    pub web_server_port: u16,

    /// 🔒 SENSITIVE: Shared secret used by Interakt to sign webhook bodies.
    /// Verification is skipped entirely when unset.
    pub interakt_webhook_secret: Option<String>,

    /// What to do with a missing or mismatched signature (NON-SENSITIVE)
    /// Values: "warn-only", "enforce"
    #[envconfig(default = "warn-only")]
    pub interakt_signature_mode: SignatureMode,

    /// Which routing gate decides if an event deserves a reply (NON-SENSITIVE)
    /// Values: "layered", "marker", "greeting"
    #[envconfig(default = "layered")]
    pub routing_mode: RoutingMode,

    /// Token that marks a message for the assistant (NON-SENSITIVE)
    #[envconfig(default = "#test")]
    pub routing_marker: String,

    /// 🔒 SENSITIVE: API key for the chat-completions backend.
    /// Replies fall back to canned messages when unset.
    pub completion_api_key: Option<String>,

    /// Model identifier sent to the completion backend (NON-SENSITIVE)
    #[envconfig(default = "gpt-4o-mini")]
    pub completion_model: String,

    /// Chat-completions endpoint (NON-SENSITIVE)
    #[envconfig(default = "https://api.openai.com/v1/chat/completions")]
    pub completion_endpoint: String,

    /// Upper bound for a single completion call, in seconds (NON-SENSITIVE)
    #[envconfig(default = "15")]
    pub completion_timeout_secs: u64,

    /// Maximum tokens the backend may generate per reply (NON-SENSITIVE)
    #[envconfig(default = "200")]
    pub completion_max_tokens: u32,

    /// Sampling temperature (NON-SENSITIVE)
    #[envconfig(default = "0.7")]
    pub completion_temperature: f32,

    /// 🔒 SENSITIVE: Logfire write token, traces stay local when unset
    pub logfire_token: Option<String>,
}

impl AppConfig {
    /// Settings consumed by the webhook endpoint itself
    pub fn webhook_settings(&self) -> WebhookSettings {
        WebhookSettings {
            signature_secret: self
                .interakt_webhook_secret
                .clone()
                .filter(|secret| !secret.trim().is_empty()),
            signature_mode: self.interakt_signature_mode,
        }
    }

    /// Completion backend settings, `None` when no API key is configured
    pub fn completion_settings(&self) -> Option<CompletionSettings> {
        let api_key = self
            .completion_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())?;

        Some(CompletionSettings {
            endpoint: self.completion_endpoint.clone(),
            api_key,
            model: self.completion_model.clone(),
            max_tokens: self.completion_max_tokens,
            temperature: self.completion_temperature,
        })
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs.max(1))
    }
}

/// Signature policy injected into the webhook endpoint.
#[derive(Debug, Clone, Default)]
pub struct WebhookSettings {
    /// 🔒 SENSITIVE: HMAC secret, `None` disables verification
    pub signature_secret: Option<String>,
    pub signature_mode: SignatureMode,
}

/// Parameters of the chat-completions collaborator.
#[derive(Clone)]
pub struct CompletionSettings {
    pub endpoint: String,
    /// 🔒 SENSITIVE
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Global application configuration instance
///
/// Only `main` reads it. If loading fails, the application will panic with a
/// descriptive error message.
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    AppConfig::init_from_env()
        .expect("Failed to load application configuration. Check environment variables.")
});
