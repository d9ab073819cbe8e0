//! Anthropic Claude generator.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GenerationError, GenerationResult, Result};
use crate::traits::generator::Generator;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Generator backed by the Anthropic messages API.
pub struct ClaudeGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl ClaudeGenerator {
    pub fn new(api_key: &str, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: super::http_client(60)?,
            api_key: SecretString::from(api_key.to_string()),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Generator for ClaudeGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> GenerationResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Claude request failed");
                GenerationError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Claude API error");
            return Err(GenerationError::Api(format!("Claude {status}: {error_text}")));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        body.content
            .into_iter()
            .find_map(|block| block.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GenerationError::Empty {
                provider: "claude".into(),
            })
    }

    fn name(&self) -> &str {
        "claude"
    }
}
