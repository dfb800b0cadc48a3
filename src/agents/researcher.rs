//! Researcher Agent
//!
//! Runs one structured analysis completion per record, sequentially, and
//! merges the parsed sections back into the record. A failed request only
//! affects its own record.

use tracing::{info, warn};

use super::sections::parse_sections;
use crate::llm::LLM;
use crate::models::Record;
use crate::types::StageOutcome;

const ANALYSIS_TEMPERATURE: f32 = 0.7;

/// Progress after one record has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchProgress {
    pub completed: usize,
    pub total: usize,
}

impl ResearchProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

pub struct ResearcherAgent;

impl ResearcherAgent {
    pub fn create_analysis_prompt(record: &Record) -> String {
        format!(
            r#"Act as a Ph.D. Researcher. Analyze this abstract:
TITLE: {}
ABSTRACT: {}

Strictly output the analysis using these 4 Headers.

SUMMARY:
[Write a VERY DETAILED 200-word technical summary. Do not be brief.]

METHODOLOGY:
[Explain the methods in at least 15 lines of text. Be specific about algorithms/data.]

ANALYSIS:
[List 5 Key Themes and 1 Critical Research Gap.]

HYPOTHESIS:
[Propose 1 novel hypothesis in bold text.]"#,
            record.title, record.abstract_text
        )
    }

    /// Analyze every record in order, reporting progress after each one.
    ///
    /// The outcome is degraded when at least one record failed; its value
    /// still holds every record, failed ones carrying `Error: <reason>`
    /// as summary.
    pub async fn analyze_records<F>(
        llm: &LLM,
        records: Vec<Record>,
        mut on_progress: F,
    ) -> StageOutcome<Vec<Record>>
    where
        F: FnMut(ResearchProgress),
    {
        let total = records.len();
        info!(total, model = %llm.model(), "Analyzing records");

        let mut analyzed = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (index, mut record) in records.into_iter().enumerate() {
            let prompt = Self::create_analysis_prompt(&record);
            match llm.complete(&prompt, Some(ANALYSIS_TEMPERATURE)).await {
                Ok(text) => {
                    record.apply_sections(parse_sections(&text));
                    info!(index, title = %record.title, "Record analyzed");
                }
                Err(e) => {
                    warn!(index, title = %record.title, error = %e, "Record analysis failed");
                    record.summary = format!("Error: {}", e);
                    failures.push(format!("{}: {}", record.title, e));
                }
            }
            analyzed.push(record);
            on_progress(ResearchProgress {
                completed: index + 1,
                total,
            });
        }

        if failures.is_empty() {
            StageOutcome::Ok(analyzed)
        } else {
            StageOutcome::degraded(
                analyzed,
                format!("{} of {} records failed: {}", failures.len(), total, failures.join("; ")),
            )
        }
    }
}
