//! Search Module
//!
//! External bibliographic services used by the literature stages:
//! - arXiv (record acquisition) - relevance-sorted search over the Atom API
//! - OpenAlex (enrichment) - citation counts and concept labels by title
//!
//! Both sit behind async traits so the stages can run against any backend.

pub mod arxiv;
pub mod openalex;

pub use arxiv::ArxivClient;
pub use openalex::OpenAlexClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::CitationMetadata;

/// Errors that can occur during search and metadata lookups
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse search results: {0}")]
    ParseError(String),

    #[error("No results found for query")]
    NoResults,
}

/// One hit returned by the bibliographic search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub abstract_text: String,
    pub canonical_url: String,
    pub document_url: Option<String>,
    pub external_id: Option<String>,
    pub published_year: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Relevance-sorted search returning at most `limit` hits
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Citation metadata for the best match of `title`
    async fn lookup(&self, title: &str) -> Result<CitationMetadata, SearchError>;
}

/// Collapse runs of whitespace (feeds wrap titles over lines)
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
