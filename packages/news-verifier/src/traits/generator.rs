//! Text-generation capability.

use async_trait::async_trait;

use crate::error::GenerationResult;

/// An opaque language-model call.
///
/// Implementations wrap a specific provider (Ollama, OpenAI, Claude, ...).
/// Every call site in the pipeline handles the error; nothing here is
/// allowed to take a verification down.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for `prompt`, bounded to `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> GenerationResult<String>;

    /// Provider name for logs.
    fn name(&self) -> &str {
        "generator"
    }
}
