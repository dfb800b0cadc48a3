//! Session state and pipeline orchestration
//!
//! `SessionState` is the run-scoped state every stage reads from and
//! writes to. `Pipeline` owns the external clients and runs one stage at a
//! time against a session, each stage touching only its own fields.

use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::{
    AnalystAgent, EditorAgent, FileUploadAgent, HypothesisAgent, LiteratureAgent, PaperDraft,
    ResearchProgress, ResearcherAgent, WriterAgent,
};
use crate::analysis::TabularDataset;
use crate::config::{Config, PipelineConfig};
use crate::document::render_pdf;
use crate::llm::{LLMProviderConfig, LLM};
use crate::models::{AnalystReport, GlobalHypothesisReport, KnowledgeBase};
use crate::search::{ArxivClient, MetadataProvider, OpenAlexClient, SearchProvider};
use crate::types::{AppError, AppResult, StageOutcome};

#[derive(Debug, Clone)]
pub struct SessionState {
    pub run_id: Uuid,
    pub topic: String,
    pub knowledge_base: KnowledgeBase,
    pub global_hypotheses: Option<GlobalHypothesisReport>,
    pub dataset: Option<TabularDataset>,
    pub analyst_report: Option<AnalystReport>,
    pub paper: Option<PaperDraft>,
    pub editor_response: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            topic: String::new(),
            knowledge_base: KnowledgeBase::default(),
            global_hypotheses: None,
            dataset: None,
            analyst_report: None,
            paper: None,
            editor_response: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the reasons of degraded sub-steps into one stage outcome
#[derive(Default)]
struct Degradations(Vec<String>);

impl Degradations {
    fn note<T>(&mut self, step: &str, outcome: StageOutcome<T>) -> T {
        if let Some(reason) = outcome.reason() {
            self.0.push(format!("{}: {}", step, reason));
        }
        outcome.into_value()
    }

    fn finish(self) -> StageOutcome<()> {
        if self.0.is_empty() {
            StageOutcome::Ok(())
        } else {
            StageOutcome::degraded((), self.0.join("; "))
        }
    }
}

pub struct Pipeline {
    policy: PipelineConfig,
    search: Box<dyn SearchProvider>,
    metadata: Box<dyn MetadataProvider>,
    research_llm: LLM,
    writer_llm: LLM,
}

impl Pipeline {
    pub fn new(
        policy: PipelineConfig,
        search: Box<dyn SearchProvider>,
        metadata: Box<dyn MetadataProvider>,
        research_llm: LLM,
        writer_llm: LLM,
    ) -> Self {
        Self {
            policy,
            search,
            metadata,
            research_llm,
            writer_llm,
        }
    }

    /// Build every client from configuration. Clients that cannot be
    /// constructed are replaced by unavailable ones; this never fails.
    pub fn from_config(config: &Config) -> Self {
        let research_llm = LLM::connect(LLMProviderConfig {
            name: config.llm.research_provider.clone(),
            api_key: config.llm.api_key_for(&config.llm.research_provider),
            model: config.llm.research_model.clone(),
        });
        let writer_llm = LLM::connect(LLMProviderConfig {
            name: config.llm.writer_provider.clone(),
            api_key: config.llm.api_key_for(&config.llm.writer_provider),
            model: config.llm.writer_model.clone(),
        });

        Self::new(
            config.pipeline.clone(),
            Box::new(ArxivClient::from_config(&config.search)),
            Box::new(OpenAlexClient::from_config(config)),
            research_llm,
            writer_llm,
        )
    }

    /// Acquire, filter, analyze and synthesize for `topic`.
    ///
    /// Replaces the knowledge base and the global hypotheses wholesale.
    pub async fn start_research<F>(
        &self,
        session: &mut SessionState,
        topic: &str,
        on_progress: F,
    ) -> StageOutcome<()>
    where
        F: FnMut(ResearchProgress),
    {
        info!(run_id = %session.run_id, topic = %topic, "Starting research");
        let mut degradations = Degradations::default();
        session.topic = topic.to_string();

        let raw = degradations.note(
            "search",
            LiteratureAgent::fetch_records(self.search.as_ref(), topic, self.policy.search_limit).await,
        );
        let filtered = LiteratureAgent::enrich_and_filter(self.metadata.as_ref(), raw, &self.policy).await;
        let analyzed = degradations.note(
            "analysis",
            ResearcherAgent::analyze_records(&self.research_llm, filtered, on_progress).await,
        );
        session.knowledge_base = KnowledgeBase::new(topic, analyzed);

        let hypotheses = degradations.note(
            "hypotheses",
            HypothesisAgent::generate(&self.research_llm, topic, &session.knowledge_base).await,
        );
        session.global_hypotheses = Some(hypotheses);

        let outcome = degradations.finish();
        match outcome.reason() {
            Some(reason) => warn!(records = session.knowledge_base.len(), reason = %reason, "Research finished degraded"),
            None => info!(records = session.knowledge_base.len(), "Research complete"),
        }
        outcome
    }

    /// Replace the session dataset with one synthesized for the session topic.
    /// A failed generation leaves the previous dataset in place.
    pub async fn generate_synthetic_dataset(&self, session: &mut SessionState) -> StageOutcome<()> {
        let outcome = AnalystAgent::generate_synthetic_data(&self.research_llm, &session.topic).await;
        let reason = outcome.reason().map(str::to_string);
        if let Some(dataset) = outcome.into_value() {
            session.dataset = Some(dataset);
        }
        match reason {
            Some(reason) => StageOutcome::degraded((), reason),
            None => StageOutcome::Ok(()),
        }
    }

    pub fn load_dataset(&self, session: &mut SessionState, path: &Path) -> AppResult<()> {
        let dataset = TabularDataset::from_path(path)?;
        info!(path = %path.display(), rows = dataset.row_count(), "Dataset loaded");
        session.dataset = Some(dataset);
        Ok(())
    }

    pub async fn run_analyst(&self, session: &mut SessionState) -> StageOutcome<()> {
        let Some(dataset) = session.dataset.as_ref() else {
            return StageOutcome::degraded((), "no dataset loaded");
        };
        let mut degradations = Degradations::default();
        let report = degradations.note("narrative", AnalystAgent::run(&self.research_llm, dataset).await);
        session.analyst_report = Some(report);
        degradations.finish()
    }

    pub async fn write_paper(&self, session: &mut SessionState) -> StageOutcome<()> {
        let hypotheses = session
            .global_hypotheses
            .as_ref()
            .filter(|report| report.is_available())
            .map(|report| report.text.as_str());
        let insight = session.analyst_report.as_ref().map(|report| report.ai_insight.as_str());

        let mut degradations = Degradations::default();
        let paper = degradations.note(
            "writer",
            WriterAgent::write_paper(
                &self.writer_llm,
                &session.topic,
                &session.knowledge_base,
                hypotheses,
                insight,
            )
            .await,
        );
        session.paper = Some(paper);
        degradations.finish()
    }

    /// PDF bytes of the session paper
    pub fn render_paper(&self, session: &SessionState) -> AppResult<Vec<u8>> {
        let paper = session
            .paper
            .as_ref()
            .ok_or_else(|| AppError::Export("No paper has been written yet".to_string()))?;
        render_pdf(&paper.text)
    }

    pub async fn edit_draft(&self, session: &mut SessionState, draft: &str, instruction: &str) -> StageOutcome<()> {
        let mut degradations = Degradations::default();
        let feedback = degradations.note("editor", EditorAgent::edit(&self.writer_llm, draft, instruction).await);
        session.editor_response = Some(feedback);
        degradations.finish()
    }

    /// Import an uploaded draft file and edit it
    pub async fn edit_upload(
        &self,
        session: &mut SessionState,
        filename: &str,
        content: &[u8],
        instruction: &str,
    ) -> AppResult<StageOutcome<()>> {
        let draft = FileUploadAgent::extract_draft(filename, content)?;
        Ok(self.edit_draft(session, &draft, instruction).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GLOBAL_HYPOTHESIS_FAILED;
    use crate::testing::{long_abstract, FakeLlm, FakeMetadata, FakeSearch};

    const STRUCTURED: &str = "SUMMARY: s\nMETHODOLOGY: m\nANALYSIS: a\nHYPOTHESIS: h";

    fn pipeline(search: FakeSearch, research: &FakeLlm, writer: &FakeLlm) -> Pipeline {
        Pipeline::new(
            PipelineConfig::default(),
            Box::new(search),
            Box::new(FakeMetadata::default()),
            research.llm(),
            writer.llm(),
        )
    }

    #[tokio::test]
    async fn test_start_research_rebuilds_knowledge_base() {
        let research = FakeLlm::new(|request| {
            if request.messages[0].content.contains("Principal Investigator") {
                Ok("## Hypothesis 1\n## Hypothesis 2\n## Hypothesis 3".to_string())
            } else {
                Ok(STRUCTURED.to_string())
            }
        });
        let writer = FakeLlm::replying("unused");
        let pipeline = pipeline(FakeSearch::with_titles(&["A", "B"]), &research, &writer);

        let mut session = SessionState::new();
        session.knowledge_base = KnowledgeBase::new("old", vec![crate::models::Record::new("Stale", long_abstract("x"))]);

        let mut fractions = Vec::new();
        let outcome = pipeline.start_research(&mut session, "graphs", |p| fractions.push(p.fraction())).await;

        assert!(!outcome.is_degraded());
        assert_eq!(session.topic, "graphs");
        let titles: Vec<&str> = session.knowledge_base.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(fractions, vec![0.5, 1.0]);
        assert_eq!(session.global_hypotheses.as_ref().unwrap().blocks().len(), 3);
    }

    #[tokio::test]
    async fn test_unavailable_hypotheses_are_not_passed_to_writer() {
        let research = FakeLlm::failing("down");
        let writer = FakeLlm::replying("Paper");
        let pipeline = pipeline(FakeSearch::with_titles(&["A"]), &research, &writer);

        let mut session = SessionState::new();
        let outcome = pipeline.start_research(&mut session, "graphs", |_| {}).await;
        assert!(outcome.is_degraded());
        assert_eq!(session.global_hypotheses.as_ref().unwrap().text, GLOBAL_HYPOTHESIS_FAILED);

        let outcome = pipeline.write_paper(&mut session).await;
        assert!(!outcome.is_degraded());
        assert!(!writer.prompt(0).contains(GLOBAL_HYPOTHESIS_FAILED));
        assert_eq!(session.paper.as_ref().unwrap().text, "Paper");
        assert!(pipeline.render_paper(&session).unwrap().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_analyst_without_dataset() {
        let llm = FakeLlm::replying("unused");
        let pipeline = pipeline(FakeSearch::with_titles(&[]), &llm, &llm);
        let mut session = SessionState::new();
        assert!(pipeline.run_analyst(&mut session).await.is_degraded());
        assert!(session.analyst_report.is_none());
    }

    #[tokio::test]
    async fn test_failed_synthetic_data_keeps_previous_dataset() {
        let llm = FakeLlm::failing("down");
        let pipeline = pipeline(FakeSearch::with_titles(&[]), &llm, &llm);
        let mut session = SessionState::new();
        session.dataset = Some(TabularDataset::from_csv_str("a\n1\n").unwrap());

        assert!(pipeline.generate_synthetic_dataset(&mut session).await.is_degraded());
        assert_eq!(session.dataset.as_ref().unwrap().headers, vec!["a"]);
    }

    #[tokio::test]
    async fn test_insight_reaches_writer() {
        let research = FakeLlm::replying("Skewed distribution");
        let writer = FakeLlm::replying("Paper");
        let pipeline = pipeline(FakeSearch::with_titles(&[]), &research, &writer);
        let mut session = SessionState::new();
        session.knowledge_base = KnowledgeBase::new("t", vec![crate::models::Record::new("A", long_abstract("a"))]);
        session.dataset = Some(TabularDataset::from_csv_str("v\n1\n3\n").unwrap());

        assert!(!pipeline.run_analyst(&mut session).await.is_degraded());
        pipeline.write_paper(&mut session).await;
        assert!(writer.prompt(0).contains("DATA INSIGHTS:\nSkewed distribution"));
    }

    #[test]
    fn test_render_without_paper() {
        let llm = FakeLlm::replying("unused");
        let pipeline = pipeline(FakeSearch::with_titles(&[]), &llm, &llm);
        assert!(matches!(pipeline.render_paper(&SessionState::new()), Err(AppError::Export(_))));
    }

    #[tokio::test]
    async fn test_edit_upload() {
        let llm = FakeLlm::replying("**Critique**");
        let pipeline = pipeline(FakeSearch::with_titles(&[]), &llm, &llm);
        let mut session = SessionState::new();

        let outcome = pipeline
            .edit_upload(&mut session, "draft.txt", b"Draft text", "")
            .await
            .unwrap();
        assert!(!outcome.is_degraded());
        assert_eq!(session.editor_response.as_deref(), Some("**Critique**"));
        assert!(pipeline.edit_upload(&mut session, "draft.docx", b"x", "").await.is_err());
    }
}
