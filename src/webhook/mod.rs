//! Webhook handlers for external integrations
//!
//! ## Modules
//!
//! - [`interakt`] - Interakt chat webhook receiver

pub mod interakt;
pub mod routes;

use crate::{
    config::{AppConfig, WebhookSettings},
    services::completion::ChatCompletionClient,
};
use interakt::{composer::ReplyComposer, routing::RoutingPolicy};
use std::sync::Arc;

/// Immutable state shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub settings: WebhookSettings,
    pub policy: Arc<RoutingPolicy>,
    pub composer: Arc<ReplyComposer>,
}

impl AppState {
    pub fn from_config(app_config: &AppConfig) -> anyhow::Result<Self> {
        let policy = RoutingPolicy::from_mode(app_config.routing_mode, &app_config.routing_marker)?;

        let completion = app_config.completion_settings().map(|settings| {
            Box::new(ChatCompletionClient::new(settings)) as crate::services::ImplCompletionService
        });
        let composer = ReplyComposer::new(completion, app_config.completion_timeout());

        if !composer.has_backend() {
            logfire::warn!("COMPLETION_API_KEY not set, accepted messages get canned replies");
        }
        let settings = app_config.webhook_settings();
        if settings.signature_secret.is_none() {
            logfire::warn!("INTERAKT_WEBHOOK_SECRET not set, signatures are not verified");
        }

        Ok(Self {
            settings,
            policy: Arc::new(policy),
            composer: Arc::new(composer),
        })
    }
}
