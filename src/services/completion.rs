//! # Chat Completions Client
//!
//! Calls an OpenAI-compatible `/chat/completions` endpoint with a fixed system
//! instruction and the user's text, and returns the first choice's content.

use crate::{config::CompletionSettings, consts};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// Chat-completions request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    /// "system" or "user"
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(settings: &'a CompletionSettings, prompt: &'a str) -> Self {
        Self {
            model: &settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: consts::ASSISTANT_SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }
}

/// Chat-completions response body, only the fields we read
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Trimmed content of the first choice, an error when it is absent or blank
    pub fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .context("completion response has no message content")
    }
}

/// HTTP client for the chat-completions backend
pub struct ChatCompletionClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    settings: CompletionSettings,
}

impl ChatCompletionClient {
    pub fn new(settings: CompletionSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    async fn request_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest::new(&self.settings, prompt);

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to completion API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            anyhow::bail!("Completion API returned error status {}: {}", status, body);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion API response")?;

        completion.into_content()
    }
}

#[async_trait]
impl super::CompletionService for ChatCompletionClient {
    async fn complete_text(&self, prompt: &str) -> Result<String> {
        let span = logfire::span!(
            "chat completion with {model}",
            model = self.settings.model.clone()
        );

        self.request_completion(prompt).instrument(span).await
    }
}
