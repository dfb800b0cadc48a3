// Type definitions shared by the pipeline stages

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Groq,
    Google,
}

impl LLMProvider {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "openai" => Some(LLMProvider::OpenAI),
            "groq" => Some(LLMProvider::Groq),
            "google" | "gemini" => Some(LLMProvider::Google),
            _ => None,
        }
    }
}

impl fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Groq => write!(f, "groq"),
            LLMProvider::Google => write!(f, "google"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LLMRequest {
    /// Single user-turn request, the shape every stage sends.
    pub fn user_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Result of one pipeline stage.
///
/// A stage never fails past its own boundary: when an external call goes
/// wrong the stage still hands back a value (a placeholder, a sentinel
/// string or an empty collection) together with the reason it degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Ok(T),
    Degraded { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        StageOutcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StageOutcome::Ok(_) => None,
            StageOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Ok(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Ok(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }
}
