// Scripted stand-ins for the external services, shared by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::{LLMAdapter, LLM};
use crate::models::CitationMetadata;
use crate::search::{MetadataProvider, SearchError, SearchHit, SearchProvider};
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

pub fn long_abstract(prefix: &str) -> String {
    format!("{} - this abstract is comfortably longer than the fifty character minimum.", prefix)
}

pub struct FakeSearch {
    hits: Vec<SearchHit>,
    error: Option<String>,
}

impl FakeSearch {
    pub fn with_titles(titles: &[&str]) -> Self {
        let hits = titles
            .iter()
            .enumerate()
            .map(|(i, title)| SearchHit {
                title: title.to_string(),
                abstract_text: long_abstract(title),
                canonical_url: format!("http://arxiv.org/abs/{}", i),
                document_url: Some(format!("http://arxiv.org/pdf/{}", i)),
                external_id: None,
                published_year: "2023".to_string(),
            })
            .collect();
        Self { hits, error: None }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            hits: Vec::new(),
            error: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        match &self.error {
            Some(message) => Err(SearchError::RequestFailed(message.clone())),
            None => Ok(self.hits.iter().take(limit).cloned().collect()),
        }
    }
}

#[derive(Default)]
pub struct FakeMetadata {
    entries: HashMap<String, CitationMetadata>,
    lookups: AtomicUsize,
}

impl FakeMetadata {
    pub fn with_entry(mut self, title: &str, metadata: CitationMetadata) -> Self {
        self.entries.insert(title.to_string(), metadata);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn lookup(&self, title: &str) -> Result<CitationMetadata, SearchError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.entries.get(title).cloned().ok_or(SearchError::NoResults)
    }
}

type Responder = dyn Fn(&LLMRequest) -> Result<String, String> + Send + Sync;

/// LLM adapter answering through a closure and recording every request
#[derive(Clone)]
pub struct FakeLlm {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<LLMRequest>>>,
}

impl FakeLlm {
    pub fn new(responder: impl Fn(&LLMRequest) -> Result<String, String> + Send + Sync + 'static) -> Self {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| Err(message.clone()))
    }

    pub fn llm(&self) -> LLM {
        LLM::from_adapter("fake", "fake-model", Box::new(self.clone()))
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Text of the single user message of request `index`
    pub fn prompt(&self, index: usize) -> String {
        self.requests()
            .get(index)
            .and_then(|r| r.messages.first())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LLMAdapter for FakeLlm {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let content = (self.responder)(request).map_err(AppError::LLMApi)?;
        Ok(LLMResponse {
            content,
            finish_reason: "stop".to_string(),
            usage: TokenUsage::default(),
        })
    }
}
