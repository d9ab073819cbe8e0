//! `news-verify`: check a news claim from the command line.

mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use news_verifier::{
    create_generator, Claim, HttpFetcher, LocaleCatalogue, NewsVerifier, SearchMode,
    SerpApiSearcher, VerificationStrategy,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "news-verify", version, about = "Check how plausible a news claim is")]
struct Cli {
    /// Claim headline
    #[arg(long, required_unless_present = "text", conflicts_with = "text")]
    title: Option<String>,

    /// Claim summary or lead paragraph
    #[arg(long, default_value = "")]
    summary: String,

    /// Outlet the claim came from
    #[arg(long, default_value = "")]
    source: String,

    /// Publication date, as printed by the outlet
    #[arg(long, default_value = "")]
    date: String,

    /// Free text to verify instead of a headline
    #[arg(long)]
    text: Option<String>,

    /// Search budget: fast, medium or large
    #[arg(long, default_value = "fast")]
    mode: SearchMode,

    #[arg(long, value_enum, default_value_t = StrategyArg::Multi)]
    strategy: StrategyArg,

    /// Print the verdict bundle as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Seven-stage multi-agent reasoning
    Multi,
    /// One-shot credibility prompt
    Standard,
}

impl From<StrategyArg> for VerificationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Multi => Self::MultiAgent,
            StrategyArg::Standard => Self::Standard,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,news_verifier=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!(
        provider = config.provider.kind(),
        locale_table = ?config.locale_table,
        search_qps = config.search_qps,
        "Loaded configuration"
    );

    let generator = create_generator(&config.provider).context("Failed to configure AI provider")?;
    let searcher = SerpApiSearcher::new(config.serpapi_key.expose_secret(), config.search_qps)
        .context("Failed to configure SerpAPI")?;
    let catalogue = match &config.locale_table {
        Some(path) => LocaleCatalogue::from_path(path)
            .with_context(|| format!("Failed to load locale table {}", path.display()))?,
        None => LocaleCatalogue::builtin().context("Built-in locale table is invalid")?,
    };
    let fetcher = HttpFetcher::new().context("Failed to build page fetcher")?;

    let verifier = NewsVerifier::new(generator, Arc::new(searcher), Arc::new(catalogue))
        .with_fetcher(Arc::new(fetcher));

    let claim = match (&cli.text, &cli.title) {
        (Some(text), _) => Claim::from_text(text.as_str()),
        (None, Some(title)) => Claim::new(title.as_str(), cli.summary.as_str(), cli.source.as_str(), cli.date.as_str()),
        (None, None) => anyhow::bail!("either --title or --text is required"),
    };

    info!(mode = %cli.mode, ad_hoc = claim.is_ad_hoc(), "Starting verification");
    let verdict = verifier
        .verify_with(&claim, cli.mode, cli.strategy.into())
        .await;

    if cli.json {
        let json = serde_json::to_string_pretty(&verdict).context("Failed to serialize verdict")?;
        println!("{json}");
    } else {
        print!("{}", render::render(&claim, &verdict));
    }

    Ok(())
}
