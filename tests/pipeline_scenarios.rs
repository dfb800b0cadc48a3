//! End-to-end pipeline scenarios against scripted services

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};

use scholar_bot::config::PipelineConfig;
use scholar_bot::llm::{LLMAdapter, LLM};
use scholar_bot::models::{
    CitationMetadata, GLOBAL_HYPOTHESIS_FAILED, HYPOTHESIS_PLACEHOLDER, INSIGHT_UNAVAILABLE,
    METHODOLOGY_PLACEHOLDER,
};
use scholar_bot::search::{MetadataProvider, SearchError, SearchHit, SearchProvider};
use scholar_bot::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
use scholar_bot::{Pipeline, SessionState};

struct ScriptedSearch(Result<Vec<SearchHit>, String>);

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        match &self.0 {
            Ok(hits) => Ok(hits.iter().take(limit).cloned().collect()),
            Err(e) => Err(SearchError::RequestFailed(e.clone())),
        }
    }
}

struct ScriptedMetadata {
    fail: bool,
}

#[async_trait]
impl MetadataProvider for ScriptedMetadata {
    async fn lookup(&self, title: &str) -> Result<CitationMetadata, SearchError> {
        if self.fail {
            return Err(SearchError::RequestFailed("metadata down".to_string()));
        }
        Ok(CitationMetadata {
            citation_count: title.len() as u64,
            concepts: vec!["Graph".into(), "Learning".into(), "Networks".into(), "Extra".into()],
        })
    }
}

/// Answers by prompt kind; `fail_when` makes matching prompts fail
#[derive(Clone)]
struct ScriptedLlm {
    fail_when: Option<&'static str>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    fn new(fail_when: Option<&'static str>) -> Self {
        Self {
            fail_when,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn llm(&self) -> LLM {
        LLM::from_adapter("scripted", "scripted-model", Box::new(self.clone()))
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMAdapter for ScriptedLlm {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let prompt = request.messages[0].content.clone();
        self.prompts.lock().unwrap().push(prompt.clone());

        if let Some(needle) = self.fail_when {
            if prompt.contains(needle) {
                return Err(AppError::LLMApi("503 Service Unavailable".to_string()));
            }
        }

        let content = if prompt.contains("Ph.D. Researcher") {
            "**SUMMARY:** Detailed summary.\nMETHODOLOGY: Message passing.\nANALYSIS: Oversmoothing gap.\nHYPOTHESIS: **Depth helps.**".to_string()
        } else if prompt.contains("Principal Investigator") {
            "# Ranked Global Hypotheses\n\n## Hypothesis 1: Depth\nStatement: ...\nRationale: ...\n\n## Hypothesis 2: Sparsity\nStatement: ...\nRationale: ...\n\n## Hypothesis 3: Attention\nStatement: ...\nRationale: ...".to_string()
        } else if prompt.contains("Data Generator") {
            "```csv\nmodel,layers,accuracy,dataset\nGCN,2,0.81,Cora\nGAT,,0.83,Cora\nGIN,4,,\n```".to_string()
        } else if prompt.contains("Lead Data Scientist") {
            "1. Data Quality Assessment\n2. Statistical Patterns & Outliers\n3. Research Implications".to_string()
        } else if prompt.contains("Senior Academic Editor") {
            "**Critique**\n**Improvements**\n**Rewrite**".to_string()
        } else {
            "Title: Graph Neural Networks Revisited\nAbstract ...".to_string()
        };

        Ok(LLMResponse {
            content,
            finish_reason: "stop".to_string(),
            usage: TokenUsage::default(),
        })
    }
}

fn hit(title: &str, abstract_text: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
        canonical_url: format!("http://arxiv.org/abs/{}", title.len()),
        document_url: None,
        external_id: None,
        published_year: "2024".to_string(),
    }
}

fn long(text: &str) -> String {
    format!("{} studies message passing on graphs and reports results on citation benchmarks.", text)
}

/// Eight raw hits: one exact duplicate title and one 30-character abstract
fn eight_raw_hits() -> Vec<SearchHit> {
    vec![
        hit("Graph Convolutional Networks", &long("GCN")),
        hit("Graph Attention Networks", &long("GAT")),
        hit("Graph Convolutional Networks", &long("A copy")),
        hit("How Powerful are GNNs", "This abstract is 30 chars long"),
        hit("Inductive Representation Learning", &long("GraphSAGE")),
        hit("Simplifying Graph Convolutions", &long("SGC")),
        hit("Deeper Insights into GCNs", &long("Oversmoothing")),
        hit("Graph U-Nets", &long("Pooling")),
    ]
}

fn pipeline(
    search: ScriptedSearch,
    metadata: ScriptedMetadata,
    research: &ScriptedLlm,
    writer: &ScriptedLlm,
) -> Pipeline {
    Pipeline::new(
        PipelineConfig::default(),
        Box::new(search),
        Box::new(metadata),
        research.llm(),
        writer.llm(),
    )
}

#[tokio::test]
async fn graph_neural_networks_end_to_end() {
    assert_eq!("This abstract is 30 chars long".len(), 30);

    let research = ScriptedLlm::new(None);
    let writer = ScriptedLlm::new(None);
    let pipeline = pipeline(
        ScriptedSearch(Ok(eight_raw_hits())),
        ScriptedMetadata { fail: false },
        &research,
        &writer,
    );
    let mut session = SessionState::new();

    let mut progress = Vec::new();
    let outcome = pipeline
        .start_research(&mut session, "graph neural networks", |p| progress.push(p.fraction()))
        .await;
    assert!(!outcome.is_degraded(), "unexpected degradation: {:?}", outcome.reason());

    let records = &session.knowledge_base.records;
    assert_eq!(records.len(), 5);
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Graph Convolutional Networks",
            "Graph Attention Networks",
            "Inductive Representation Learning",
            "Simplifying Graph Convolutions",
            "Deeper Insights into GCNs",
        ]
    );
    for record in records {
        assert!(record.abstract_text.len() >= 50);
        assert_eq!(record.concepts.len(), 3);
        assert_eq!(record.methodology, "Message passing.");
        assert_eq!(record.analysis, "Oversmoothing gap.");
        assert_eq!(record.hypothesis, "**Depth helps.**");
        assert!(record.summary.contains("Detailed summary."));
    }
    assert_eq!(progress, vec![0.2, 0.4, 0.6, 0.8, 1.0]);

    let hypotheses = session.global_hypotheses.as_ref().unwrap();
    assert!(hypotheses.is_available());
    assert_ne!(hypotheses.text, GLOBAL_HYPOTHESIS_FAILED);
    assert_eq!(hypotheses.blocks().len(), 3);
    assert_eq!(hypotheses.record_count, 5);

    // Five analyses plus one synthesis
    assert_eq!(research.prompts().len(), 6);

    assert!(!pipeline.generate_synthetic_dataset(&mut session).await.is_degraded());
    assert!(!pipeline.run_analyst(&mut session).await.is_degraded());
    let report = session.analyst_report.as_ref().unwrap();
    assert_eq!(report.cleaned_data.row_count, 3);
    assert_eq!(report.cleaned_data.column("dataset").unwrap().cell(2).as_deref(), Some("Cora"));

    assert!(!pipeline.write_paper(&mut session).await.is_degraded());
    let writer_prompt = &writer.prompts()[0];
    assert!(writer_prompt.starts_with("TOPIC: graph neural networks"));
    assert!(writer_prompt.contains("## Hypothesis 3: Attention"));
    assert!(writer_prompt.contains("DATA INSIGHTS:\n1. Data Quality Assessment"));
    assert_eq!(session.paper.as_ref().unwrap().model, "scripted-model");

    let pdf = assert_ok!(pipeline.render_paper(&session));
    assert!(pdf.starts_with(b"%PDF"));
}

#[tokio::test]
async fn failing_record_does_not_abort_batch() {
    let research = ScriptedLlm::new(Some("TITLE: Graph Attention Networks"));
    let writer = ScriptedLlm::new(None);
    let hits = vec![
        hit("Graph Convolutional Networks", &long("GCN")),
        hit("Graph Attention Networks", &long("GAT")),
        hit("Graph U-Nets", &long("Pooling")),
    ];
    let pipeline = pipeline(ScriptedSearch(Ok(hits)), ScriptedMetadata { fail: true }, &research, &writer);
    let mut session = SessionState::new();

    let outcome = pipeline.start_research(&mut session, "graph neural networks", |_| {}).await;
    assert!(outcome.is_degraded());

    let records = &session.knowledge_base.records;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].hypothesis, "**Depth helps.**");
    assert_eq!(records[2].hypothesis, "**Depth helps.**");

    assert!(records[1].summary.starts_with("Error: "));
    assert!(records[1].summary.contains("503"));
    assert_eq!(records[1].methodology, METHODOLOGY_PLACEHOLDER);
    assert_eq!(records[1].hypothesis, HYPOTHESIS_PLACEHOLDER);

    // Metadata failures fall back to defaults
    assert!(records.iter().all(|r| r.citation_count == 0 && r.concepts.is_empty()));
    // Synthesis still ran
    assert!(session.global_hypotheses.as_ref().unwrap().is_available());
}

#[tokio::test]
async fn no_stage_raises_when_every_service_fails() {
    let research = ScriptedLlm::new(Some(""));
    let writer = ScriptedLlm::new(Some(""));
    let pipeline = pipeline(
        ScriptedSearch(Err("connection reset".to_string())),
        ScriptedMetadata { fail: true },
        &research,
        &writer,
    );
    let mut session = SessionState::new();

    let outcome = pipeline.start_research(&mut session, "graph neural networks", |_| {}).await;
    assert!(outcome.is_degraded());
    assert!(session.knowledge_base.is_empty());
    assert_eq!(session.global_hypotheses.as_ref().unwrap().text, GLOBAL_HYPOTHESIS_FAILED);

    assert!(pipeline.generate_synthetic_dataset(&mut session).await.is_degraded());
    assert!(session.dataset.is_none());

    session.dataset = Some(assert_ok!(scholar_bot::analysis::TabularDataset::from_csv_str("x,y\n1,a\n,\n")));
    assert!(pipeline.run_analyst(&mut session).await.is_degraded());
    assert_eq!(session.analyst_report.as_ref().unwrap().ai_insight, INSIGHT_UNAVAILABLE);

    assert!(pipeline.write_paper(&mut session).await.is_degraded());
    let paper = session.paper.as_ref().unwrap();
    assert!(paper.text.starts_with("Error: "));
    assert_eq!(paper.model, "None");
    assert_ok!(pipeline.render_paper(&session));

    assert!(pipeline.edit_draft(&mut session, "Some draft", "").await.is_degraded());
    assert!(session.editor_response.as_ref().unwrap().starts_with("Editing Error: "));

    assert_err!(pipeline.edit_upload(&mut session, "draft.exe", b"MZ", "").await);
}

#[tokio::test]
async fn research_rerun_replaces_knowledge_base() {
    let research = ScriptedLlm::new(None);
    let writer = ScriptedLlm::new(None);
    let pipeline = pipeline(
        ScriptedSearch(Ok(eight_raw_hits())),
        ScriptedMetadata { fail: false },
        &research,
        &writer,
    );
    let mut session = SessionState::new();

    pipeline.start_research(&mut session, "first topic", |_| {}).await;
    pipeline.start_research(&mut session, "second topic", |_| {}).await;

    assert_eq!(session.topic, "second topic");
    assert_eq!(session.knowledge_base.topic, "second topic");
    assert_eq!(session.knowledge_base.len(), 5);
    assert_eq!(session.global_hypotheses.as_ref().unwrap().topic, "second topic");
}
