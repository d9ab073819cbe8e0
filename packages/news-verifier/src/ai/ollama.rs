//! Local Ollama generator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GenerationError, GenerationResult, Result};
use crate::traits::generator::Generator;

/// Generator backed by a local Ollama `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: Options,
}

#[derive(Serialize)]
struct Options {
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

impl OllamaGenerator {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            // local models are slow on first load
            client: super::http_client(120)?,
            url: url.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> GenerationResult<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: Options {
                num_predict: max_tokens,
            },
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "Ollama request failed");
                GenerationError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!("Ollama {status}: {error_text}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        body.response
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| GenerationError::Empty {
                provider: "ollama".into(),
            })
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
