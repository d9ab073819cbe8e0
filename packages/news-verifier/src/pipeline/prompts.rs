//! LLM prompts for query construction and credibility synthesis.
//!
//! Wording is content: stages depend only on the output formats named here
//! (`Q1:` lines for queries, the `TYPE:` line for the router, the verdict
//! labels for the synthesizer).

/// Prompt for three short search-query candidates.
pub const QUERY_PROMPT: &str = r#"Write three short web search queries (2-5 words each) that would find reporting about this news item.

TITLE: {title}
SUMMARY: {summary}

Answer with exactly three lines and nothing else:
Q1: <query>
Q2: <query>
Q3: <query>"#;

/// Router: picks the kind of analysis the claim needs.
pub const ROUTER_PROMPT: &str = r#"You are the Router agent. Read the content and choose the most appropriate verification method.

CONTENT TO ANALYZE:
Title: {title}
Summary: {summary}
Evidence digest: {content}

AVAILABLE ANALYSIS TYPES:
1. SCIENTIFIC: studies, research, discoveries, statistics
2. NARRATIVE: stories, general events, context pieces
3. TECHNICAL: technology, innovations, products
4. MEDICAL: health, drugs, therapies
5. ECONOMIC: finance, markets, companies
6. POLITICAL: elections, laws, institutions
7. NEWS: accidents, incidents, breaking events

ANSWER FORMAT:
TYPE: [SCIENTIFIC/NARRATIVE/TECHNICAL/MEDICAL/ECONOMIC/POLITICAL/NEWS]
REASON: [why this type fits]
APPROACH: [the specific method to use]"#;

/// Investigator: gathers the key facts from the evidence.
pub const INVESTIGATOR_PROMPT: &str = r#"You are the Investigator agent, specialized in {analysis} analysis.
Analyze the available sources and identify the key information.

CLAIM: {title}
ANALYSIS TYPE: {analysis}
FACT-CHECKING SOURCES:
{fact_checks}
RELIABLE SOURCES:
{reliable}

SPECIALIZED TASKS:
{tasks}

RESULT:
- Key information found
- Elements specific to this analysis type
- Claims that need verification
- Suspicious or partisan sources"#;

/// Methodologist: judges the quality of cited studies and sources.
pub const METHODOLOGIST_PROMPT: &str = r#"You are the Methodology Analyst agent. Assess the quality of the studies and sources identified.

CLAIM: {title}
IDENTIFIED SOURCES: {investigator}

TASKS:
1. For every study or source mentioned:
   - assess the methodology (sample, controls, design)
   - check the outlet or journal quality (peer review, reputation)
   - look for known methodological criticism
2. Flag high-quality sources, weak methodologies and predatory outlets.

RESULT:
- Methodological assessment per source
- Outlet quality
- Criticism found
- Recommendations"#;

/// Fact checker: tests the specific statements.
pub const FACT_CHECKER_PROMPT: &str = r#"You are the Fact Checker agent. Check the truthfulness of the specific facts.

CLAIM: {title}
IDENTIFIED STATEMENTS: {investigator}

TASKS:
1. For every specific statement: is it supported by evidence, contradicted, or unverifiable?
2. Look for contradictions between sources, timeline inconsistencies and manipulated data.

RESULT:
- Facts verified as correct
- Facts contradicted or doubtful
- Contradictions found
- Information gaps"#;

/// Bias analyzer: conflicts of interest and manipulation.
pub const BIAS_ANALYZER_PROMPT: &str = r#"You are the Judge agent. Analyze bias, conflicts of interest and manipulation.

CLAIM: {title}
IDENTIFIED SOURCES: {investigator}
METHODOLOGY ASSESSMENT: {methodologist}

TASKS:
1. Who benefits from spreading this claim? Are there economic or political ties?
2. Identify selection, confirmation, temporal and geographic bias.
3. Look for cherry-picked data, misleading context and significant omissions.

RESULT:
- Conflicts of interest
- Detected bias
- Suspected manipulation
- Reliability level of the sources"#;

/// Consensus analyzer: agreement among sources and experts.
pub const CONSENSUS_ANALYZER_PROMPT: &str = r#"You are the Consensus agent. Analyze the expert and source consensus on the topic.

CLAIM: {title}
IDENTIFIED SOURCES: {investigator}
METHODOLOGY ASSESSMENT: {methodologist}

TASKS:
1. How many sources agree, how many contradict, how strong is the agreement?
2. Do the high-quality sources agree? Is the consensus based on solid evidence?
3. Classify: strong consensus (90%+), weak consensus (60-90%), controversy (no clear consensus).

RESULT:
- Consensus level
- Consensus quality
- Open controversies
- Outliers and their reliability"#;

/// Synthesizer: combines every stage into the final verdict.
pub const SYNTHESIZER_PROMPT: &str = r#"You are the Synthesizer agent. Combine every agent's findings into the final verdict.

CLAIM: {title}

AGENT FINDINGS:
INVESTIGATOR: {investigator}
METHODOLOGIST: {methodologist}
FACT CHECKER: {fact_checker}
JUDGE: {bias_analyzer}
CONSENSUS: {consensus_analyzer}

FINAL VERDICT:
1. **VERDICT**: [TRUE] / [FALSE] / [DUBIOUS] / [INSUFFICIENT DATA]
2. **CONFIDENCE**: [HIGH 90%+] / [MEDIUM 70-90%] / [LOW <70%]
3. **KEY EVIDENCE**: the most important proof
4. **CONSENSUS**: level of agreement among experts
5. **CONFLICTS OF INTEREST**: bias identified
6. **LIMITATIONS**: what cannot be known
7. **REASONING**: explain the final reasoning

Answer in the language of the claim, with a structured analysis."#;

/// One-shot credibility assessment.
pub const STANDARD_PROMPT: &str = r#"You are a professional fact checker. Assess the credibility of this news item using the verification evidence below.

TITLE: {title}
SUMMARY: {summary}
SOURCE: {source}
DATE: {date}

VERIFICATION EVIDENCE:
{evidence}

Answer with:
1. **VERDICT**: [TRUE] / [FALSE] / [DUBIOUS] / [INSUFFICIENT DATA]
2. **CONFIDENCE**: [HIGH] / [MEDIUM] / [LOW]
3. **KEY EVIDENCE**: the facts that support the verdict
4. **REASONING**: a short explanation

Answer in the language of the claim."#;

/// Substitute `{name}` placeholders in a single pass over `template`.
///
/// Inserted values are never rescanned, so braces inside a title or a stage
/// output survive verbatim. Unknown placeholders are left as written.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[1..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Format the query-candidate prompt.
pub fn format_query_prompt(title: &str, summary: &str) -> String {
    fill(QUERY_PROMPT, &[("title", title), ("summary", summary)])
}

/// Format the router prompt.
pub fn format_router_prompt(title: &str, summary: &str, content: &str) -> String {
    fill(
        ROUTER_PROMPT,
        &[("title", title), ("summary", summary), ("content", content)],
    )
}

/// Format the investigator prompt with its type-specific tasks.
pub fn format_investigator_prompt(
    title: &str,
    analysis: &str,
    fact_checks: &str,
    reliable: &str,
    tasks: &str,
) -> String {
    fill(
        INVESTIGATOR_PROMPT,
        &[
            ("title", title),
            ("analysis", analysis),
            ("fact_checks", fact_checks),
            ("reliable", reliable),
            ("tasks", tasks),
        ],
    )
}

/// Format a prompt that only needs the claim statement and prior stage outputs.
///
/// `outputs` pairs placeholder names (without braces) with stage text.
pub fn format_stage_prompt(template: &str, title: &str, outputs: &[(&str, &str)]) -> String {
    let mut values = Vec::with_capacity(outputs.len() + 1);
    values.push(("title", title));
    values.extend_from_slice(outputs);
    fill(template, &values)
}

/// Format the one-shot credibility prompt.
pub fn format_standard_prompt(
    title: &str,
    summary: &str,
    source: &str,
    date: &str,
    evidence: &str,
) -> String {
    fill(
        STANDARD_PROMPT,
        &[
            ("title", title),
            ("summary", summary),
            ("source", source),
            ("date", date),
            ("evidence", evidence),
        ],
    )
}
