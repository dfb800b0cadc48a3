//! OpenAlex Client
//!
//! Looks up citation counts and concept labels for a paper title.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{MetadataProvider, SearchError};
use crate::models::CitationMetadata;

pub struct OpenAlexClient {
    client: Client,
    api_base: String,
    contact_email: String,
    max_concepts: usize,
}

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    cited_by_count: u64,
    #[serde(default)]
    concepts: Vec<Concept>,
}

#[derive(Debug, Deserialize)]
struct Concept {
    display_name: String,
}

impl OpenAlexClient {
    pub fn new(api_base: &str, contact_email: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            contact_email: contact_email.to_string(),
            max_concepts: 3,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(&config.metadata.openalex_api_base, &config.metadata.contact_email)
            .with_max_concepts(config.pipeline.max_concepts)
    }

    pub fn with_max_concepts(mut self, max: usize) -> Self {
        self.max_concepts = max;
        self
    }
}

/// Commas separate filters in OpenAlex, so they cannot appear in the value
fn title_filter(title: &str) -> String {
    format!("title.search:{}", title.replace(',', " "))
}

#[async_trait]
impl MetadataProvider for OpenAlexClient {
    async fn lookup(&self, title: &str) -> Result<CitationMetadata, SearchError> {
        let url = format!("{}/works", self.api_base);
        let mut params = vec![("filter", title_filter(title))];
        if !self.contact_email.is_empty() {
            params.push(("mailto", self.contact_email.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::RequestFailed(format!("OpenAlex returned {}", status)));
        }

        let works: WorksResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        let work = works.results.into_iter().next().ok_or(SearchError::NoResults)?;
        debug!(title = %title, citations = work.cited_by_count, "OpenAlex match found");

        Ok(CitationMetadata {
            citation_count: work.cited_by_count,
            concepts: work
                .concepts
                .into_iter()
                .take(self.max_concepts)
                .map(|c| c.display_name)
                .collect(),
        })
    }
}
