//! Stage results and the final verdict bundle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evidence::EvidenceBundle;
use super::locale::Locale;

/// Outcome of a single synthesis stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage produced text.
    Ok(String),
    /// The stage failed; the placeholder stands in for its output.
    Failed(String),
}

impl StageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of a whole synthesis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The final stage produced the verdict.
    Completed(String),
    /// A fallback synthesis was substituted.
    Degraded(String),
}

impl PipelineOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Completed(t) | Self::Degraded(t) => t,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Completed(t) | Self::Degraded(t) => t,
        }
    }
}

/// Output of one stage, kept for the duration of one synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStageResult {
    pub stage_name: String,
    pub text: String,
    pub failed: bool,
}

impl AgentStageResult {
    pub fn from_outcome(stage_name: impl Into<String>, outcome: StageOutcome) -> Self {
        let failed = outcome.is_failed();
        let text = match outcome {
            StageOutcome::Ok(t) | StageOutcome::Failed(t) => t,
        };
        Self {
            stage_name: stage_name.into(),
            text,
            failed,
        }
    }
}

/// How the verdict text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStrategy {
    /// Seven-stage reasoning pipeline.
    #[default]
    MultiAgent,
    /// Single one-shot credibility prompt.
    Standard,
}

/// Everything a renderer needs to display a verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictBundle {
    pub evidence: EvidenceBundle,
    pub analysis_text: String,

    /// True when a fallback synthesis replaced the final stage.
    pub degraded: bool,

    /// Search query the evidence was gathered with.
    pub query: String,

    /// Locales searched, in search order.
    pub locales: Vec<Locale>,

    /// Per-stage outputs (empty for the standard strategy).
    #[serde(default)]
    pub stages: Vec<AgentStageResult>,

    pub strategy: VerificationStrategy,
    pub verified_at: DateTime<Utc>,
}
