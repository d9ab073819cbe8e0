//! Text-generation providers and the provider factory.
//!
//! # Example
//!
//! ```rust,ignore
//! use news_verifier::ai::{create_generator, ProviderSettings};
//!
//! let settings = ProviderSettings::Ollama {
//!     url: "http://localhost:11434/api/generate".into(),
//!     model: "qwen2:7b-instruct".into(),
//! };
//! let generator = create_generator(&settings)?;
//! ```

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::ClaudeGenerator;
pub use ollama::OllamaGenerator;
pub use openai::OpenAIGenerator;

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VerifyError};
use crate::traits::generator::Generator;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2:7b-instruct";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Which provider to generate with, and its credentials.
#[derive(Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderSettings {
    Ollama {
        #[serde(default = "default_ollama_url")]
        url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
    #[serde(rename = "openai")]
    OpenAI {
        api_key: Option<String>,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Claude {
        api_key: Option<String>,
        #[serde(default = "default_claude_model")]
        model: String,
    },
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_ollama_model() -> String {
    DEFAULT_OLLAMA_MODEL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_claude_model() -> String {
    DEFAULT_CLAUDE_MODEL.to_string()
}

impl ProviderSettings {
    /// Provider name as used in configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ollama { .. } => "ollama",
            Self::OpenAI { .. } => "openai",
            Self::Claude { .. } => "claude",
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama { url, model } => f
                .debug_struct("Ollama")
                .field("url", url)
                .field("model", model)
                .finish(),
            Self::OpenAI { model, base_url, .. } => f
                .debug_struct("OpenAI")
                .field("api_key", &"[REDACTED]")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            Self::Claude { model, .. } => f
                .debug_struct("Claude")
                .field("api_key", &"[REDACTED]")
                .field("model", model)
                .finish(),
        }
    }
}

/// Build the generator named by `settings`.
///
/// A missing or blank key for a hosted provider is a configuration error.
pub fn create_generator(settings: &ProviderSettings) -> Result<Arc<dyn Generator>> {
    let generator: Arc<dyn Generator> = match settings {
        ProviderSettings::Ollama { url, model } => Arc::new(OllamaGenerator::new(url, model)?),
        ProviderSettings::OpenAI {
            api_key,
            model,
            base_url,
        } => {
            let key = required_key(api_key.as_deref(), "OpenAI")?;
            let mut generator = OpenAIGenerator::new(key, model)?;
            if let Some(url) = base_url {
                generator = generator.with_base_url(url);
            }
            Arc::new(generator)
        }
        ProviderSettings::Claude { api_key, model } => {
            let key = required_key(api_key.as_deref(), "Claude")?;
            Arc::new(ClaudeGenerator::new(key, model)?)
        }
    };
    tracing::info!(provider = settings.kind(), "Generator configured");
    Ok(generator)
}

fn required_key<'a>(key: Option<&'a str>, provider: &str) -> Result<&'a str> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(VerifyError::Config(format!("{provider} API key not configured"))),
    }
}

/// HTTP client shared by the providers.
fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(VerifyError::Client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_openai_key_is_config_error() {
        let settings = ProviderSettings::OpenAI {
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.into(),
            base_url: None,
        };
        assert!(matches!(create_generator(&settings), Err(VerifyError::Config(_))));
    }

    #[test]
    fn test_blank_claude_key_is_config_error() {
        let settings = ProviderSettings::Claude {
            api_key: Some("   ".into()),
            model: DEFAULT_CLAUDE_MODEL.into(),
        };
        assert!(matches!(create_generator(&settings), Err(VerifyError::Config(_))));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let settings = ProviderSettings::Ollama {
            url: DEFAULT_OLLAMA_URL.into(),
            model: DEFAULT_OLLAMA_MODEL.into(),
        };
        let generator = create_generator(&settings).unwrap();
        assert_eq!(generator.name(), "ollama");
    }

    #[test]
    fn test_settings_debug_redacts_keys() {
        let settings = ProviderSettings::OpenAI {
            api_key: Some("sk-super-secret".into()),
            model: "gpt-4o".into(),
            base_url: None,
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("sk-super"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: ProviderSettings =
            serde_json::from_str(r#"{"provider":"claude","api_key":"k"}"#).unwrap();
        assert_eq!(settings.kind(), "claude");
        match settings {
            ProviderSettings::Claude { model, .. } => assert_eq!(model, DEFAULT_CLAUDE_MODEL),
            _ => panic!("expected claude settings"),
        }
    }
}
