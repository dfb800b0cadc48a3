//! arXiv Client
//!
//! Queries the arXiv export API and maps the Atom feed entries to
//! [`SearchHit`]s. Results are requested sorted by relevance.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use tracing::{debug, info};

use super::{normalize_whitespace, SearchError, SearchHit, SearchProvider};

pub struct ArxivClient {
    client: Client,
    api_base: String,
}

/// Fields collected while inside one `<entry>`
#[derive(Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    published: String,
    pdf_link: Option<String>,
    doi: Option<String>,
}

impl EntryBuilder {
    fn finish(self) -> Option<SearchHit> {
        let title = normalize_whitespace(&self.title);
        if title.is_empty() {
            return None;
        }
        Some(SearchHit {
            title,
            abstract_text: abstract_text(&self.summary),
            canonical_url: self.id.trim().to_string(),
            document_url: self.pdf_link,
            external_id: self.doi.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            published_year: published_year(&self.published),
        })
    }
}

/// Abstracts keep their spacing; only line breaks become spaces
fn abstract_text(summary: &str) -> String {
    summary.trim().replace("\r\n", " ").replace('\n', " ")
}

impl ArxivClient {
    pub fn new(api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &crate::config::SearchConfig) -> Self {
        Self::new(&config.arxiv_api_base)
    }
}

#[async_trait]
impl SearchProvider for ArxivClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        info!(query = %query, limit, "Searching arXiv");

        let url = format!("{}/query", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_query", format!("all:{}", query)),
                ("start", "0".to_string()),
                ("max_results", limit.to_string()),
                ("sortBy", "relevance".to_string()),
                ("sortOrder", "descending".to_string()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::RequestFailed(format!("arXiv returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;
        debug!(bytes = body.len(), "Raw arXiv feed received");

        let mut hits = parse_feed(&body)?;
        hits.truncate(limit);
        info!(count = hits.len(), "arXiv search completed");
        Ok(hits)
    }
}

/// Parse an arXiv Atom feed into search hits, in feed order.
pub fn parse_feed(xml: &str) -> Result<Vec<SearchHit>, SearchError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut hits = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e);
                if name == "entry" {
                    entry = Some(EntryBuilder::default());
                } else if let Some(current) = entry.as_mut() {
                    if name == "link" {
                        read_link(e, current);
                    }
                    field = Some(name);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(current) = entry.as_mut() {
                    if local_name(e) == "link" {
                        read_link(e, current);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(current), Some(name)) = (entry.as_mut(), field.as_deref()) {
                    let text = e
                        .unescape()
                        .map_err(|err| SearchError::ParseError(err.to_string()))?;
                    match name {
                        "id" => current.id.push_str(&text),
                        "title" => current.title.push_str(&text),
                        "summary" => current.summary.push_str(&text),
                        "published" => current.published.push_str(&text),
                        "doi" => current.doi.get_or_insert_with(String::new).push_str(&text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref()).unwrap_or("").to_string();
                if name == "entry" {
                    if let Some(hit) = entry.take().and_then(EntryBuilder::finish) {
                        hits.push(hit);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SearchError::ParseError(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(hits)
}

fn local_name(e: &BytesStart<'_>) -> String {
    std::str::from_utf8(e.local_name().as_ref()).unwrap_or("").to_string()
}

fn read_link(e: &BytesStart<'_>, entry: &mut EntryBuilder) {
    let mut href = None;
    let mut is_pdf = false;
    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match attr.key.as_ref() {
            b"href" => href = Some(value),
            b"title" if value == "pdf" => is_pdf = true,
            b"type" if value == "application/pdf" => is_pdf = true,
            _ => {}
        }
    }
    if is_pdf {
        entry.pdf_link = href;
    }
}

/// Four-digit year of an RFC 3339 timestamp
fn published_year(published: &str) -> String {
    let published = published.trim();
    match chrono::DateTime::parse_from_rfc3339(published) {
        Ok(dt) => dt.format("%Y").to_string(),
        Err(_) => published.chars().take(4).collect(),
    }
}
