use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use news_verifier::ai::{
    ProviderSettings, DEFAULT_CLAUDE_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL,
    DEFAULT_OPENAI_MODEL,
};
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub serpapi_key: SecretString,
    pub provider: ProviderSettings,
    pub locale_table: Option<PathBuf>,
    pub search_qps: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider = match var("AI_PROVIDER")
            .unwrap_or_else(|| "ollama".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "ollama" => ProviderSettings::Ollama {
                url: var("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                model: var("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            },
            "openai" => ProviderSettings::OpenAI {
                api_key: var("OPENAI_API_KEY"),
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                base_url: None,
            },
            "claude" => ProviderSettings::Claude {
                api_key: var("CLAUDE_API_KEY"),
                model: var("CLAUDE_MODEL").unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string()),
            },
            other => bail!("AI_PROVIDER must be one of ollama, openai, claude (got '{other}')"),
        };

        Ok(Self {
            serpapi_key: var("SERPAPI_KEY")
                .context("SERPAPI_KEY must be set")?
                .into(),
            provider,
            locale_table: var("LOCALE_TABLE").map(PathBuf::from),
            search_qps: var("SEARCH_QPS")
                .unwrap_or_else(|| "1".to_string())
                .parse()
                .context("SEARCH_QPS must be a valid number")?,
        })
    }
}
