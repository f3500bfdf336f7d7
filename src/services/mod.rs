pub mod completion;

use async_trait::async_trait;

/// Generative-language backend turning a user's text into a reply
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the single textual completion for `prompt`.
    /// Network errors, non-success statuses and missing content are errors.
    async fn complete_text(&self, prompt: &str) -> anyhow::Result<String>;
}

pub type ImplCompletionService = Box<dyn CompletionService>;
