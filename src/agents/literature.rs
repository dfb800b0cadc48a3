//! Literature Agent
//!
//! Record acquisition and enrichment:
//! - fetches relevance-sorted candidates for a topic from the search service
//! - drops duplicate titles and thin abstracts
//! - attaches citation counts and concepts from the metadata service
//! - caps the surviving set so downstream completion cost stays bounded

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::models::{CitationMetadata, Record};
use crate::search::{MetadataProvider, SearchHit, SearchProvider};
use crate::types::StageOutcome;

pub struct LiteratureAgent;

impl LiteratureAgent {
    /// Fetch raw candidate records. A provider error yields an empty list.
    pub async fn fetch_records(
        search: &dyn SearchProvider,
        topic: &str,
        limit: usize,
    ) -> StageOutcome<Vec<Record>> {
        info!(topic = %topic, limit, "Fetching candidate records");

        match search.search(topic, limit).await {
            Ok(hits) => {
                let records: Vec<Record> = hits.into_iter().map(Self::record_from_hit).collect();
                info!(count = records.len(), "Candidate records fetched");
                StageOutcome::Ok(records)
            }
            Err(e) => {
                warn!(error = %e, "Search failed, continuing with no records");
                StageOutcome::degraded(Vec::new(), e.to_string())
            }
        }
    }

    pub fn record_from_hit(hit: SearchHit) -> Record {
        let mut record = Record::new(hit.title, hit.abstract_text.replace('\n', " "));
        record.source_url = hit.canonical_url;
        record.document_url = hit.document_url;
        record.external_id = hit.external_id;
        record.publication_year = hit.published_year;
        record
    }

    /// Deduplicate, filter and enrich records, preserving input order.
    ///
    /// A title is remembered as soon as it is seen, so a later copy of a
    /// rejected record is rejected too. Metadata lookups that fail leave
    /// the record with zero citations and no concepts.
    pub async fn enrich_and_filter(
        metadata: &dyn MetadataProvider,
        raw: Vec<Record>,
        policy: &PipelineConfig,
    ) -> Vec<Record> {
        let total = raw.len();
        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut kept = Vec::new();

        for mut record in raw {
            if kept.len() >= policy.max_records {
                break;
            }
            if !seen_titles.insert(record.title.clone()) {
                debug!(title = %record.title, "Skipping duplicate title");
                continue;
            }
            if record.abstract_text.chars().count() < policy.min_abstract_len {
                debug!(title = %record.title, "Skipping record with short abstract");
                continue;
            }

            let CitationMetadata { citation_count, mut concepts } =
                match metadata.lookup(&record.title).await {
                    Ok(found) => found,
                    Err(e) => {
                        debug!(title = %record.title, error = %e, "Metadata lookup failed, using defaults");
                        CitationMetadata::default()
                    }
                };
            concepts.truncate(policy.max_concepts);
            record.citation_count = citation_count;
            record.concepts = concepts;
            kept.push(record);
        }

        info!(input = total, kept = kept.len(), "Records filtered and enriched");
        kept
    }
}
