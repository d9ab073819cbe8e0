//! Multi-agent credibility synthesis.
//!
//! A fixed sequence of stage descriptors runs against one generator. Each
//! stage sees the claim, the evidence and every earlier stage's output. A
//! failed stage leaves its placeholder and the run continues; a failed final
//! stage is replaced by a deterministic simple synthesis. A panic or an
//! elapsed deadline anywhere in the run falls back to the one-shot standard
//! agent, then to the simple synthesis.

use futures::FutureExt;
use indexmap::IndexMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::prompts::{
    format_investigator_prompt, format_router_prompt, format_stage_prompt, format_standard_prompt,
    BIAS_ANALYZER_PROMPT, CONSENSUS_ANALYZER_PROMPT, FACT_CHECKER_PROMPT, METHODOLOGIST_PROMPT,
    SYNTHESIZER_PROMPT,
};
use crate::traits::generator::Generator;
use crate::types::claim::Claim;
use crate::types::evidence::{Evidence, EvidenceBundle};
use crate::types::verdict::{AgentStageResult, PipelineOutcome, StageOutcome};

/// Marker carried by every simple synthesis.
pub const LOW_CONFIDENCE_MARKER: &str = "analysis incomplete - low confidence";

/// Default budget for one whole multi-agent run.
pub const DEFAULT_PIPELINE_DEADLINE: Duration = Duration::from_secs(900);

const STANDARD_MAX_TOKENS: u32 = 800;

/// Characters of each stage output kept in the simple synthesis.
const SIMPLE_SYNTHESIS_CHARS: usize = 200;

/// Characters of evidence digest shown to the router.
const ROUTER_CONTENT_CHARS: usize = 1000;

/// Evidence items listed per collection in the investigator prompt.
const INVESTIGATOR_ITEMS: usize = 3;

/// The seven reasoning stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Router,
    Investigator,
    Methodologist,
    FactChecker,
    BiasAnalyzer,
    ConsensusAnalyzer,
    Synthesizer,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::Investigator => "investigator",
            Self::Methodologist => "methodologist",
            Self::FactChecker => "fact_checker",
            Self::BiasAnalyzer => "bias_analyzer",
            Self::ConsensusAnalyzer => "consensus_analyzer",
            Self::Synthesizer => "synthesizer",
        }
    }
}

/// Kind of analysis the router picks for a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisType {
    Scientific,
    #[default]
    Narrative,
    Technical,
    Medical,
    Economic,
    Political,
    News,
}

impl AnalysisType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scientific => "SCIENTIFIC",
            Self::Narrative => "NARRATIVE",
            Self::Technical => "TECHNICAL",
            Self::Medical => "MEDICAL",
            Self::Economic => "ECONOMIC",
            Self::Political => "POLITICAL",
            Self::News => "NEWS",
        }
    }

    /// Read the `TYPE:` line of a router answer. Unknown or missing types
    /// are `Narrative`.
    pub fn parse(router_output: &str) -> Self {
        router_output
            .lines()
            .find_map(|line| {
                let line = line.trim().trim_start_matches(['*', '-', ' ']);
                let (key, value) = line.split_once(':')?;
                let key = key.trim().trim_matches('*').to_uppercase();
                if key != "TYPE" && key != "TIPO" {
                    return None;
                }
                let label = value
                    .trim()
                    .trim_matches(|c: char| matches!(c, '[' | ']' | '*' | ' '))
                    .split(|c: char| !c.is_alphabetic())
                    .next()
                    .unwrap_or_default()
                    .to_uppercase();
                Self::from_label(&label)
            })
            .unwrap_or_default()
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "SCIENTIFIC" | "SCIENTIFICA" => Some(Self::Scientific),
            "NARRATIVE" | "NARRATIVA" => Some(Self::Narrative),
            "TECHNICAL" | "TECNICA" => Some(Self::Technical),
            "MEDICAL" | "MEDICA" => Some(Self::Medical),
            "ECONOMIC" | "ECONOMICA" => Some(Self::Economic),
            "POLITICAL" | "POLITICA" => Some(Self::Political),
            "NEWS" | "CRONACA" => Some(Self::News),
            _ => None,
        }
    }

    /// Investigator tasks for this kind of analysis.
    pub fn investigator_tasks(self) -> &'static str {
        match self {
            Self::Scientific => "1. Identify scientific studies and methodologies\n2. Check peer review and journals\n3. Verify statistics and samples\n4. Look for methodological criticism",
            Self::Narrative => "1. Identify events and chronology\n2. Check testimonies and sources\n3. Verify historical context\n4. Look for narrative contradictions",
            Self::Technical => "1. Identify technical specifications\n2. Check patents and innovations\n3. Verify technology claims\n4. Look for existing alternatives",
            Self::Medical => "1. Identify clinical studies\n2. Check FDA/EMA approvals\n3. Verify side effects\n4. Look for medical controversies",
            Self::Economic => "1. Identify economic data\n2. Check financial sources\n3. Verify market trends\n4. Look for contrasting analyses",
            Self::Political => "1. Identify political positions\n2. Check official statements\n3. Verify legislative context\n4. Look for opposition and criticism",
            Self::News => "1. Identify the reported facts\n2. Check testimonies\n3. Verify the event timeline\n4. Look for conflicting versions",
        }
    }
}

/// Everything a stage prompt may read.
pub struct StageContext<'a> {
    pub claim: &'a Claim,
    pub evidence: &'a EvidenceBundle,
    pub results: &'a IndexMap<Stage, AgentStageResult>,
    pub analysis: AnalysisType,
}

impl StageContext<'_> {
    /// Text recorded for an earlier stage, or empty.
    pub fn output(&self, stage: Stage) -> &str {
        self.results
            .get(&stage)
            .map(|r| r.text.as_str())
            .unwrap_or_default()
    }
}

/// One stage of the pipeline.
pub struct StageDescriptor {
    pub stage: Stage,
    pub max_tokens: u32,

    /// Recorded when the stage fails.
    pub placeholder: &'static str,

    /// Pure prompt builder.
    pub prompt: fn(&StageContext<'_>) -> String,
}

/// The stage sequence, in run order.
pub const PIPELINE: [StageDescriptor; 7] = [
    StageDescriptor {
        stage: Stage::Router,
        max_tokens: 200,
        placeholder: "TYPE: NARRATIVE\nREASON: fallback after error\nAPPROACH: general analysis",
        prompt: router_prompt,
    },
    StageDescriptor {
        stage: Stage::Investigator,
        max_tokens: 300,
        placeholder: "Source analysis unavailable",
        prompt: investigator_prompt,
    },
    StageDescriptor {
        stage: Stage::Methodologist,
        max_tokens: 500,
        placeholder: "Methodology assessment unavailable",
        prompt: methodologist_prompt,
    },
    StageDescriptor {
        stage: Stage::FactChecker,
        max_tokens: 400,
        placeholder: "Fact verification unavailable",
        prompt: fact_checker_prompt,
    },
    StageDescriptor {
        stage: Stage::BiasAnalyzer,
        max_tokens: 500,
        placeholder: "Bias analysis unavailable",
        prompt: bias_analyzer_prompt,
    },
    StageDescriptor {
        stage: Stage::ConsensusAnalyzer,
        max_tokens: 400,
        placeholder: "Consensus analysis unavailable",
        prompt: consensus_analyzer_prompt,
    },
    StageDescriptor {
        stage: Stage::Synthesizer,
        max_tokens: 500,
        placeholder: "Final synthesis unavailable",
        prompt: synthesizer_prompt,
    },
];

fn router_prompt(ctx: &StageContext<'_>) -> String {
    let content: String = ctx.evidence.summary.chars().take(ROUTER_CONTENT_CHARS).collect();
    format_router_prompt(ctx.claim.statement(), &ctx.claim.summary, &content)
}

fn investigator_prompt(ctx: &StageContext<'_>) -> String {
    format_investigator_prompt(
        ctx.claim.statement(),
        ctx.analysis.as_str(),
        &source_lines(ctx.evidence.fact_checks()),
        &source_lines(ctx.evidence.reliable()),
        ctx.analysis.investigator_tasks(),
    )
}

fn methodologist_prompt(ctx: &StageContext<'_>) -> String {
    format_stage_prompt(
        METHODOLOGIST_PROMPT,
        ctx.claim.statement(),
        &[("investigator", ctx.output(Stage::Investigator))],
    )
}

fn fact_checker_prompt(ctx: &StageContext<'_>) -> String {
    format_stage_prompt(
        FACT_CHECKER_PROMPT,
        ctx.claim.statement(),
        &[("investigator", ctx.output(Stage::Investigator))],
    )
}

fn bias_analyzer_prompt(ctx: &StageContext<'_>) -> String {
    format_stage_prompt(
        BIAS_ANALYZER_PROMPT,
        ctx.claim.statement(),
        &[
            ("investigator", ctx.output(Stage::Investigator)),
            ("methodologist", ctx.output(Stage::Methodologist)),
        ],
    )
}

fn consensus_analyzer_prompt(ctx: &StageContext<'_>) -> String {
    format_stage_prompt(
        CONSENSUS_ANALYZER_PROMPT,
        ctx.claim.statement(),
        &[
            ("investigator", ctx.output(Stage::Investigator)),
            ("methodologist", ctx.output(Stage::Methodologist)),
        ],
    )
}

fn synthesizer_prompt(ctx: &StageContext<'_>) -> String {
    let outputs: Vec<(&str, &str)> = [
        Stage::Investigator,
        Stage::Methodologist,
        Stage::FactChecker,
        Stage::BiasAnalyzer,
        Stage::ConsensusAnalyzer,
    ]
    .into_iter()
    .map(|stage| (stage.name(), ctx.output(stage)))
    .collect();
    format_stage_prompt(SYNTHESIZER_PROMPT, ctx.claim.statement(), &outputs)
}

fn source_lines<'a>(items: impl Iterator<Item = &'a Evidence>) -> String {
    let lines: Vec<String> = items
        .take(INVESTIGATOR_ITEMS)
        .map(|e| format!("- {} ({}) - Query: {}", e.title, e.source_label, e.search_query))
        .collect();
    if lines.is_empty() {
        "- none".to_string()
    } else {
        lines.join("\n")
    }
}

/// Result of one synthesis run.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub outcome: PipelineOutcome,

    /// Stage outputs in run order; empty when the whole pipeline failed.
    pub stages: Vec<AgentStageResult>,
}

/// Runs the stage pipeline against one generator.
pub struct MultiAgentSynthesizer {
    generator: Arc<dyn Generator>,
    deadline: Duration,
}

impl MultiAgentSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            deadline: DEFAULT_PIPELINE_DEADLINE,
        }
    }

    /// Set the whole-run deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run every stage. Always returns non-empty verdict text.
    pub async fn synthesize(&self, claim: &Claim, evidence: &EvidenceBundle) -> Synthesis {
        self.synthesize_cancellable(claim, evidence, &CancellationToken::new())
            .await
    }

    /// Run every stage, skipping the remaining ones once `cancel` fires.
    pub async fn synthesize_cancellable(
        &self,
        claim: &Claim,
        evidence: &EvidenceBundle,
        cancel: &CancellationToken,
    ) -> Synthesis {
        let run = AssertUnwindSafe(self.run_pipeline(claim, evidence, cancel)).catch_unwind();

        match tokio::time::timeout(self.deadline, run).await {
            Ok(Ok(synthesis)) => synthesis,
            Ok(Err(_)) => {
                warn!(claim = %claim.title, "Multi-agent pipeline panicked, using standard agent");
                self.pipeline_fallback(claim, evidence).await
            }
            Err(_) => {
                warn!(
                    claim = %claim.title,
                    deadline_secs = self.deadline.as_secs(),
                    "Multi-agent pipeline deadline elapsed, using standard agent"
                );
                self.pipeline_fallback(claim, evidence).await
            }
        }
    }

    /// One-shot assessment; simple synthesis if it fails.
    pub async fn standard(&self, claim: &Claim, evidence: &EvidenceBundle) -> PipelineOutcome {
        match self.standard_verification(claim, evidence).await {
            Some(text) => PipelineOutcome::Completed(text),
            None => PipelineOutcome::Degraded(simple_synthesis(claim, &IndexMap::new())),
        }
    }

    async fn run_pipeline(
        &self,
        claim: &Claim,
        evidence: &EvidenceBundle,
        cancel: &CancellationToken,
    ) -> Synthesis {
        let mut results: IndexMap<Stage, AgentStageResult> = IndexMap::new();
        let mut analysis = AnalysisType::default();

        for descriptor in &PIPELINE {
            let outcome = if cancel.is_cancelled() {
                debug!(stage = descriptor.stage.name(), "Synthesis cancelled, skipping stage");
                StageOutcome::Failed(descriptor.placeholder.to_string())
            } else {
                let ctx = StageContext {
                    claim,
                    evidence,
                    results: &results,
                    analysis,
                };
                self.run_stage(descriptor, &ctx).await
            };

            if descriptor.stage == Stage::Router {
                analysis = match &outcome {
                    StageOutcome::Ok(text) => AnalysisType::parse(text),
                    StageOutcome::Failed(_) => AnalysisType::default(),
                };
                info!(analysis = analysis.as_str(), "Router selected analysis type");
            }

            results.insert(
                descriptor.stage,
                AgentStageResult::from_outcome(descriptor.stage.name(), outcome),
            );
        }

        let outcome = match results.get(&Stage::Synthesizer) {
            Some(result) if !result.failed => PipelineOutcome::Completed(result.text.clone()),
            _ => {
                warn!(claim = %claim.title, "Final stage failed, using simple synthesis");
                PipelineOutcome::Degraded(simple_synthesis(claim, &results))
            }
        };

        Synthesis {
            outcome,
            stages: results.into_values().collect(),
        }
    }

    async fn run_stage(&self, descriptor: &StageDescriptor, ctx: &StageContext<'_>) -> StageOutcome {
        let stage = descriptor.stage.name();
        debug!(stage, "Running stage");

        let prompt = (descriptor.prompt)(ctx);
        match self.generator.generate(&prompt, descriptor.max_tokens).await {
            Ok(text) if !text.trim().is_empty() => StageOutcome::Ok(text.trim().to_string()),
            Ok(_) => {
                warn!(stage, generator = self.generator.name(), "Stage returned empty text");
                StageOutcome::Failed(descriptor.placeholder.to_string())
            }
            Err(e) => {
                warn!(stage, generator = self.generator.name(), error = %e, "Stage failed");
                StageOutcome::Failed(descriptor.placeholder.to_string())
            }
        }
    }

    async fn pipeline_fallback(&self, claim: &Claim, evidence: &EvidenceBundle) -> Synthesis {
        let text = match self.standard_verification(claim, evidence).await {
            Some(text) => text,
            None => simple_synthesis(claim, &IndexMap::new()),
        };
        Synthesis {
            outcome: PipelineOutcome::Degraded(text),
            stages: Vec::new(),
        }
    }

    async fn standard_verification(&self, claim: &Claim, evidence: &EvidenceBundle) -> Option<String> {
        let prompt = format_standard_prompt(
            claim.statement(),
            &claim.summary,
            &claim.source_label,
            &claim.published_at,
            &evidence.summary,
        );
        match self.generator.generate(&prompt, STANDARD_MAX_TOKENS).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!(generator = self.generator.name(), "Standard agent returned empty text");
                None
            }
            Err(e) => {
                warn!(generator = self.generator.name(), error = %e, "Standard agent failed");
                None
            }
        }
    }
}

/// Deterministic verdict built from whatever stages succeeded.
pub fn simple_synthesis(claim: &Claim, results: &IndexMap<Stage, AgentStageResult>) -> String {
    let available: Vec<String> = results
        .values()
        .filter(|r| !r.failed)
        .map(|r| {
            let head: String = r.text.chars().take(SIMPLE_SYNTHESIS_CHARS).collect();
            let ellipsis = if r.text.chars().count() > SIMPLE_SYNTHESIS_CHARS { "..." } else { "" };
            format!("{}: {head}{ellipsis}", r.stage_name)
        })
        .collect();

    let available = if available.is_empty() {
        "No results available".to_string()
    } else {
        available.join("\n")
    };

    format!(
        "MULTI-AGENT VERIFICATION - SIMPLIFIED SYNTHESIS\n\n\
         CLAIM: {title}\n\n\
         AVAILABLE RESULTS:\n{available}\n\n\
         NOTE: {LOW_CONFIDENCE_MARKER}. Some agents failed during the analysis; \
         retry or use the standard verification.\n\n\
         VERDICT: [DUBIOUS] - analysis incomplete\n\
         CONFIDENCE: [LOW] - insufficient data",
        title = claim.statement(),
    )
}
