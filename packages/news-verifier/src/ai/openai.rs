//! OpenAI chat-completions generator.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GenerationError, GenerationResult, Result};
use crate::traits::generator::Generator;

/// Generator backed by the OpenAI chat completions API.
pub struct OpenAIGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIGenerator {
    pub fn new(api_key: &str, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: super::http_client(60)?,
            api_key: SecretString::from(api_key.to_string()),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Reasoning models reject `max_tokens`.
    fn uses_max_completion_tokens(&self) -> bool {
        let m = self.model.as_str();
        m.starts_with("o1") || m.starts_with("o3") || m.starts_with("gpt-5")
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> GenerationResult<String> {
        let start = std::time::Instant::now();
        let (max_tokens, max_completion_tokens) = if self.uses_max_completion_tokens() {
            (None, Some(max_tokens))
        } else {
            (Some(max_tokens), None)
        };
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            max_completion_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                GenerationError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(GenerationError::Api(format!("OpenAI {status}: {error_text}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| GenerationError::Empty {
                provider: "openai".into(),
            })?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );
        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_models_use_completion_tokens() {
        let generator = OpenAIGenerator::new("sk-test", "o3-mini").unwrap();
        assert!(generator.uses_max_completion_tokens());
        let generator = OpenAIGenerator::new("sk-test", "gpt-4o")
            .unwrap()
            .with_base_url("https://proxy.local/v1");
        assert!(!generator.uses_max_completion_tokens());
        assert_eq!(generator.base_url, "https://proxy.local/v1");
    }
}
