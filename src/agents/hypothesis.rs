//! Hypothesis Agent
//!
//! Condenses the analyzed knowledge base into three ranked global
//! hypotheses with a single completion request.

use tracing::{info, warn};

use crate::llm::LLM;
use crate::models::{GlobalHypothesisReport, KnowledgeBase};
use crate::types::StageOutcome;

const SYNTHESIS_TEMPERATURE: f32 = 0.7;

pub struct HypothesisAgent;

impl HypothesisAgent {
    /// Per-record findings in knowledge-base order
    pub fn build_context(knowledge_base: &KnowledgeBase) -> String {
        knowledge_base
            .records
            .iter()
            .map(|r| format!("Paper: {}\nGap: {}\nHypothesis: {}\n\n", r.title, r.analysis, r.hypothesis))
            .collect()
    }

    pub fn create_synthesis_prompt(topic: &str, context: &str) -> String {
        format!(
            r###"Act as a Principal Investigator. Topic: "{}".
Findings: {}
Task: Formulate 3 Ranked Global Hypotheses. Each must have a Title, Statement, and Rationale.
Output in Markdown format with one heading per hypothesis, e.g. "## Hypothesis 1: <Title>"."###,
            topic, context
        )
    }

    /// Synthesize global hypotheses. Any failure yields the failure sentinel.
    pub async fn generate(
        llm: &LLM,
        topic: &str,
        knowledge_base: &KnowledgeBase,
    ) -> StageOutcome<GlobalHypothesisReport> {
        let record_count = knowledge_base.len();
        if knowledge_base.is_empty() {
            warn!(topic = %topic, "No records to synthesize hypotheses from");
            return StageOutcome::degraded(
                GlobalHypothesisReport::failed(topic, record_count),
                "knowledge base is empty",
            );
        }

        info!(topic = %topic, records = record_count, "Generating global hypotheses");
        let prompt = Self::create_synthesis_prompt(topic, &Self::build_context(knowledge_base));

        match llm.complete(&prompt, Some(SYNTHESIS_TEMPERATURE)).await {
            Ok(text) => {
                info!(response_len = text.len(), "Global hypotheses generated");
                StageOutcome::Ok(GlobalHypothesisReport::new(topic, text, record_count))
            }
            Err(e) => {
                warn!(error = %e, "Global hypothesis generation failed");
                StageOutcome::degraded(GlobalHypothesisReport::failed(topic, record_count), e.to_string())
            }
        }
    }
}
