// Core research models

use serde::{Deserialize, Serialize};

use crate::analysis::{CleanedDataset, DescriptiveStatistics};

pub const SUMMARY_PLACEHOLDER: &str = "Summary not generated.";
pub const METHODOLOGY_PLACEHOLDER: &str = "Methodology not generated.";
pub const ANALYSIS_PLACEHOLDER: &str = "Analysis not generated.";
pub const HYPOTHESIS_PLACEHOLDER: &str = "Hypothesis not generated.";

/// Returned instead of hypotheses when the synthesis request fails
pub const GLOBAL_HYPOTHESIS_FAILED: &str = "Global Hypothesis Generation Failed.";
/// Narrative used when the statistics request fails
pub const INSIGHT_UNAVAILABLE: &str = "N/A";

/// One bibliographic item plus the fields derived from it by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique key within a run
    pub title: String,
    pub abstract_text: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub publication_year: String,
    pub citation_count: u64,
    pub concepts: Vec<String>,
    pub summary: String,
    pub methodology: String,
    pub analysis: String,
    pub hypothesis: String,
}

impl Record {
    /// A freshly acquired record: no enrichment, analysis fields at their placeholders.
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            source_url: String::new(),
            document_url: None,
            external_id: None,
            publication_year: String::new(),
            citation_count: 0,
            concepts: Vec::new(),
            summary: SUMMARY_PLACEHOLDER.to_string(),
            methodology: METHODOLOGY_PLACEHOLDER.to_string(),
            analysis: ANALYSIS_PLACEHOLDER.to_string(),
            hypothesis: HYPOTHESIS_PLACEHOLDER.to_string(),
        }
    }

    /// Full-text link when known, otherwise the landing page
    pub fn preferred_link(&self) -> Option<&str> {
        self.document_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| Some(self.source_url.as_str()).filter(|u| !u.is_empty()))
    }

    pub fn apply_sections(&mut self, sections: RecordSections) {
        self.summary = sections.summary;
        self.methodology = sections.methodology;
        self.analysis = sections.analysis;
        self.hypothesis = sections.hypothesis;
    }
}

/// The four analysis fields extracted from one completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSections {
    pub summary: String,
    pub methodology: String,
    pub analysis: String,
    pub hypothesis: String,
}

impl Default for RecordSections {
    fn default() -> Self {
        Self {
            summary: SUMMARY_PLACEHOLDER.to_string(),
            methodology: METHODOLOGY_PLACEHOLDER.to_string(),
            analysis: ANALYSIS_PLACEHOLDER.to_string(),
            hypothesis: HYPOTHESIS_PLACEHOLDER.to_string(),
        }
    }
}

/// Citation metadata attached during enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationMetadata {
    pub citation_count: u64,
    pub concepts: Vec<String>,
}

/// Ordered sequence of analyzed records for one topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub topic: String,
    pub records: Vec<Record>,
}

/// One line of the research dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRow {
    pub title: String,
    pub year: String,
    pub citations: u64,
}

impl KnowledgeBase {
    pub fn new(topic: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            topic: topic.into(),
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn dashboard_rows(&self) -> Vec<DashboardRow> {
        self.records
            .iter()
            .map(|r| DashboardRow {
                title: r.title.clone(),
                year: r.publication_year.clone(),
                citations: r.citation_count,
            })
            .collect()
    }
}

/// Ranked hypotheses synthesized from one knowledge-base snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalHypothesisReport {
    pub topic: String,
    pub text: String,
    /// Number of records the report was built from
    pub record_count: usize,
}

impl GlobalHypothesisReport {
    pub fn new(topic: impl Into<String>, text: impl Into<String>, record_count: usize) -> Self {
        Self {
            topic: topic.into(),
            text: text.into(),
            record_count,
        }
    }

    pub fn failed(topic: impl Into<String>, record_count: usize) -> Self {
        Self::new(topic, GLOBAL_HYPOTHESIS_FAILED, record_count)
    }

    /// False when the text is the failure sentinel
    pub fn is_available(&self) -> bool {
        self.text.trim() != GLOBAL_HYPOTHESIS_FAILED
    }

    /// Split the text into one block per heading that names a hypothesis.
    ///
    /// A heading is a markdown `#` line or a line wrapped in `**`. Text
    /// before the first such heading is dropped.
    pub fn blocks(&self) -> Vec<String> {
        if !self.is_available() {
            return Vec::new();
        }

        let mut blocks: Vec<String> = Vec::new();
        for line in self.text.lines() {
            let trimmed = line.trim();
            let is_heading = trimmed.starts_with('#')
                || (trimmed.len() > 4 && trimmed.starts_with("**") && trimmed.ends_with("**"));
            if is_heading && trimmed.to_lowercase().contains("hypothesis") {
                blocks.push(String::from(trimmed));
            } else if let Some(current) = blocks.last_mut() {
                current.push('\n');
                current.push_str(line);
            }
        }
        blocks.into_iter().map(|b| b.trim_end().to_string()).collect()
    }
}

/// Output of the tabular analyst stage
#[derive(Debug, Clone, PartialEq)]
pub struct AnalystReport {
    pub cleaned_data: CleanedDataset,
    pub statistics: DescriptiveStatistics,
    pub ai_insight: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_placeholders() {
        let record = Record::new("Title", "Abstract");
        assert_eq!(record.summary, SUMMARY_PLACEHOLDER);
        assert_eq!(record.methodology, METHODOLOGY_PLACEHOLDER);
        assert_eq!(record.analysis, ANALYSIS_PLACEHOLDER);
        assert_eq!(record.hypothesis, HYPOTHESIS_PLACEHOLDER);
        assert_eq!(record.citation_count, 0);
        assert!(record.concepts.is_empty());
    }

    #[test]
    fn test_preferred_link() {
        let mut record = Record::new("Title", "Abstract");
        assert_eq!(record.preferred_link(), None);

        record.source_url = "http://arxiv.org/abs/1234".to_string();
        assert_eq!(record.preferred_link(), Some("http://arxiv.org/abs/1234"));

        record.document_url = Some("http://arxiv.org/pdf/1234".to_string());
        assert_eq!(record.preferred_link(), Some("http://arxiv.org/pdf/1234"));
    }

    #[test]
    fn test_dashboard_rows() {
        let mut record = Record::new("GNNs", "Abstract");
        record.publication_year = "2021".to_string();
        record.citation_count = 12;
        let kb = KnowledgeBase::new("graphs", vec![record]);

        assert_eq!(
            kb.dashboard_rows(),
            vec![DashboardRow { title: "GNNs".to_string(), year: "2021".to_string(), citations: 12 }]
        );
    }

    #[test]
    fn test_hypothesis_blocks() {
        let text = "# Global Hypotheses\nIntro line\n## Hypothesis 1: Depth\nStatement: a\n\n## Hypothesis 2: Width\nStatement: b\n**Hypothesis 3: Noise**\nRationale: c\n";
        let report = GlobalHypothesisReport::new("graphs", text, 3);
        let blocks = report.blocks();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("## Hypothesis 1"));
        assert!(blocks[0].contains("Statement: a"));
        assert!(blocks[2].ends_with("Rationale: c"));
    }

    #[test]
    fn test_failed_report_has_no_blocks() {
        let report = GlobalHypothesisReport::failed("graphs", 0);
        assert!(!report.is_available());
        assert!(report.blocks().is_empty());
        assert_eq!(report.text, GLOBAL_HYPOTHESIS_FAILED);
    }
}
