//! Analyst Agent
//!
//! LLM-facing half of the tabular analyst: synthetic dataset generation
//! and the narrative over descriptive statistics.

use tracing::{info, warn};

use crate::analysis::{DescriptiveStatistics, TabularDataset};
use crate::llm::LLM;
use crate::models::{AnalystReport, INSIGHT_UNAVAILABLE};
use crate::types::StageOutcome;

const DATA_TEMPERATURE: f32 = 0.5;

pub struct AnalystAgent;

impl AnalystAgent {
    pub fn create_synthetic_data_prompt(topic: &str) -> String {
        format!(
            r#"Act as a Data Generator. Create a realistic CSV dataset for: "{}".
Requirements: 20 rows, 4 columns (mix categorical/numeric), realistic values.
Output ONLY CSV text."#,
            topic
        )
    }

    pub fn create_insight_prompt(stats_text: &str) -> String {
        format!(
            r#"Act as a Lead Data Scientist. Analyze this statistics summary: {}

Provide a DETAILED report with 3 sections:
1. Data Quality Assessment (10 lines)
2. Statistical Patterns & Outliers (10 lines)
3. Research Implications (5 lines)"#,
            stats_text
        )
    }

    /// Ask the model for a topic-relevant CSV table. `None` when the request
    /// fails or the reply is not a table.
    pub async fn generate_synthetic_data(llm: &LLM, topic: &str) -> StageOutcome<Option<TabularDataset>> {
        info!(topic = %topic, "Generating synthetic dataset");

        let text = match llm
            .complete(&Self::create_synthetic_data_prompt(topic), Some(DATA_TEMPERATURE))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Synthetic data request failed");
                return StageOutcome::degraded(None, e.to_string());
            }
        };

        match TabularDataset::from_csv_str(strip_code_fence(&text)) {
            Ok(dataset) => {
                info!(rows = dataset.row_count(), columns = dataset.column_count(), "Synthetic dataset parsed");
                StageOutcome::Ok(Some(dataset))
            }
            Err(e) => {
                warn!(error = %e, "Synthetic data reply is not a table");
                StageOutcome::degraded(None, e.to_string())
            }
        }
    }

    /// Clean the dataset, describe it, and ask for a narrative.
    /// The narrative falls back to `N/A`; cleaning and statistics never fail.
    pub async fn run(llm: &LLM, dataset: &TabularDataset) -> StageOutcome<AnalystReport> {
        let cleaned_data = dataset.clean();
        let statistics = DescriptiveStatistics::from_cleaned(&cleaned_data);
        let stats_text = statistics.render();
        info!(
            rows = cleaned_data.row_count,
            numeric = statistics.numeric.len(),
            categorical = statistics.categorical.len(),
            "Dataset cleaned and described"
        );

        let insight = llm
            .complete(&Self::create_insight_prompt(&stats_text), Some(DATA_TEMPERATURE))
            .await;

        match insight {
            Ok(ai_insight) => StageOutcome::Ok(AnalystReport {
                cleaned_data,
                statistics,
                ai_insight,
            }),
            Err(e) => {
                warn!(error = %e, "Statistical narrative failed");
                StageOutcome::degraded(
                    AnalystReport {
                        cleaned_data,
                        statistics,
                        ai_insight: INSIGHT_UNAVAILABLE.to_string(),
                    },
                    e.to_string(),
                )
            }
        }
    }
}

/// Body of the first fenced code block, or the whole text when unfenced
pub fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text.trim();
    };
    let after_open = &text[open + 3..];
    // Skip the info string (e.g. "csv") on the opening fence line
    let body = match after_open.find('\n') {
        Some(newline) => &after_open[newline + 1..],
        None => after_open,
    };
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}
