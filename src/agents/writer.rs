//! Writer Agent
//!
//! Folds the literature findings, the global hypotheses and the data
//! insight into one context and asks the writer model for a full paper.

use tracing::{info, warn};

use crate::llm::LLM;
use crate::models::KnowledgeBase;
use crate::types::StageOutcome;

/// Stand-in for the data insight when no analysis was run
pub const NO_ANALYSIS_SENTINEL: &str = "No Data Analysis Performed.";
/// Stand-in for the hypotheses when synthesis failed or never ran
pub const NO_HYPOTHESES_SENTINEL: &str = "No hypotheses available.";
/// Model identifier reported when no paper was produced
pub const NO_MODEL: &str = "None";

const PAPER_INSTRUCTION: &str = "Write a full academic Research Paper. Sections: Title, Abstract, Intro, Lit Review, Methodology, Results, Conclusion. No Markdown.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperDraft {
    pub text: String,
    /// Model that wrote the text, or `None` on failure
    pub model: String,
}

impl PaperDraft {
    fn failed(reason: &str) -> Self {
        Self {
            text: format!("Error: {}", reason),
            model: NO_MODEL.to_string(),
        }
    }
}

pub struct WriterAgent;

impl WriterAgent {
    /// Context in fixed order: topic, literature, hypotheses, data insights.
    pub fn build_context(
        topic: &str,
        knowledge_base: &KnowledgeBase,
        hypotheses: Option<&str>,
        insight: Option<&str>,
    ) -> String {
        let mut context = format!("TOPIC: {}\n\nLITERATURE:\n", topic);
        for record in &knowledge_base.records {
            context.push_str(&format!(
                "Title: {}\nSummary: {}\nMethod: {}\nGap: {}\n\n",
                record.title, record.summary, record.methodology, record.analysis
            ));
        }
        context.push_str(&format!(
            "HYPOTHESES:\n{}\n\nDATA INSIGHTS:\n{}\n",
            hypotheses.unwrap_or(NO_HYPOTHESES_SENTINEL),
            insight.unwrap_or(NO_ANALYSIS_SENTINEL)
        ));
        context
    }

    pub async fn write_paper(
        llm: &LLM,
        topic: &str,
        knowledge_base: &KnowledgeBase,
        hypotheses: Option<&str>,
        insight: Option<&str>,
    ) -> StageOutcome<PaperDraft> {
        if knowledge_base.is_empty() {
            warn!(topic = %topic, "No literature to write from");
            return StageOutcome::degraded(
                PaperDraft::failed("no literature available, run research first"),
                "knowledge base is empty",
            );
        }

        let context = Self::build_context(topic, knowledge_base, hypotheses, insight);
        info!(topic = %topic, context_len = context.len(), model = %llm.model(), "Writing paper");

        match llm.complete(&format!("{}\n\n{}", context, PAPER_INSTRUCTION), None).await {
            Ok(text) => {
                info!(paper_len = text.len(), "Paper written");
                StageOutcome::Ok(PaperDraft {
                    text,
                    model: llm.model().to_string(),
                })
            }
            Err(e) => {
                warn!(error = %e, "Paper generation failed");
                StageOutcome::degraded(PaperDraft::failed(&e.to_string()), e.to_string())
            }
        }
    }
}
