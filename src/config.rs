use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LLMConfig,
    pub search: SearchConfig,
    pub metadata: MetadataConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub groq_api_key: String,
    pub gemini_api_key: String,
    pub openai_api_key: String,
    /// Provider used by the analyzer, synthesizer and tabular analyst
    pub research_provider: String,
    pub research_model: String,
    /// Provider used by the writer and editor
    pub writer_provider: String,
    pub writer_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub arxiv_api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    pub openalex_api_base: String,
    pub contact_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Raw candidates requested from the search service
    pub search_limit: usize,
    /// Records kept after enrichment and filtering
    pub max_records: usize,
    pub min_abstract_len: usize,
    pub max_concepts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LLMConfig {
                groq_api_key: String::new(),
                gemini_api_key: String::new(),
                openai_api_key: String::new(),
                research_provider: "groq".to_string(),
                research_model: crate::llm::groq::DEFAULT_MODEL.to_string(),
                writer_provider: "google".to_string(),
                writer_model: crate::llm::google::DEFAULT_MODEL.to_string(),
            },
            search: SearchConfig {
                arxiv_api_base: "http://export.arxiv.org/api".to_string(),
            },
            metadata: MetadataConfig {
                openalex_api_base: "https://api.openalex.org".to_string(),
                contact_email: String::new(),
            },
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_limit: 8,
            max_records: 5,
            min_abstract_len: 50,
            max_concepts: 3,
        }
    }
}

impl LLMConfig {
    /// API key for a provider id, empty when unknown or unset
    pub fn api_key_for(&self, provider: &str) -> String {
        match provider.trim().to_lowercase().as_str() {
            "groq" => self.groq_api_key.clone(),
            "google" | "gemini" => self.gemini_api_key.clone(),
            "openai" => self.openai_api_key.clone(),
            _ => String::new(),
        }
    }
}

impl Config {
    /// Read configuration from the environment (and `.env` when present).
    ///
    /// Missing credentials are not an error here: the clients built from
    /// them report the problem when constructed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            llm: LLMConfig {
                groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
                gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                research_provider: env::var("RESEARCH_LLM_PROVIDER")
                    .unwrap_or(defaults.llm.research_provider),
                research_model: env::var("RESEARCH_LLM_MODEL")
                    .unwrap_or(defaults.llm.research_model),
                writer_provider: env::var("WRITER_LLM_PROVIDER")
                    .unwrap_or(defaults.llm.writer_provider),
                writer_model: env::var("WRITER_LLM_MODEL").unwrap_or(defaults.llm.writer_model),
            },
            search: SearchConfig {
                arxiv_api_base: env::var("ARXIV_API_BASE")
                    .unwrap_or(defaults.search.arxiv_api_base),
            },
            metadata: MetadataConfig {
                openalex_api_base: env::var("OPENALEX_API_BASE")
                    .unwrap_or(defaults.metadata.openalex_api_base),
                contact_email: env::var("USER_EMAIL").unwrap_or_default(),
            },
            pipeline: PipelineConfig {
                search_limit: parse_var("SEARCH_RESULT_LIMIT", defaults.pipeline.search_limit)?,
                max_records: parse_var("KNOWLEDGE_BASE_CAP", defaults.pipeline.max_records)?,
                min_abstract_len: parse_var("MIN_ABSTRACT_LEN", defaults.pipeline.min_abstract_len)?,
                max_concepts: parse_var("MAX_CONCEPTS", defaults.pipeline.max_concepts)?,
            },
        })
    }
}

fn parse_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
