use async_trait::async_trait;
use tracing::{error, info};

use crate::types::{AppError, AppResult, LLMProvider, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for one LLM client
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub model: String,
}

/// A client that could not be constructed. Every request fails with the
/// construction error so the calling stage degrades instead of crashing.
struct UnavailableAdapter {
    reason: String,
}

#[async_trait]
impl LLMAdapter for UnavailableAdapter {
    async fn create_chat_completion(&self, _request: &LLMRequest) -> AppResult<LLMResponse> {
        Err(AppError::LLMApi(self.reason.clone()))
    }
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
    model: String,
    available: bool,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let kind = LLMProvider::from_id(&provider.name)
            .ok_or_else(|| AppError::Config(format!("Unsupported provider: {}", provider.name)))?;

        if provider.api_key.trim().is_empty() {
            return Err(AppError::Config(format!("No API key configured for {}", kind)));
        }
        if provider.model.trim().is_empty() {
            return Err(AppError::Config(format!("No model configured for {}", kind)));
        }

        let adapter: Box<dyn LLMAdapter> = match kind {
            LLMProvider::OpenAI => Box::new(crate::llm::openai::OpenAIAdapter::new(&provider.api_key)),
            LLMProvider::Groq => Box::new(crate::llm::groq::GroqAdapter::new(&provider.api_key)),
            LLMProvider::Google => Box::new(crate::llm::google::GoogleAdapter::new(&provider.api_key)),
        };

        Ok(Self {
            adapter,
            provider_name: kind.to_string(),
            model: provider.model,
            available: true,
        })
    }

    /// Build a client, or an unavailable stand-in when construction fails.
    pub fn connect(provider: LLMProviderConfig) -> Self {
        let name = provider.name.clone();
        let model = provider.model.clone();
        match Self::new(provider) {
            Ok(llm) => {
                info!(provider = %llm.provider_name, model = %llm.model, "LLM client ready");
                llm
            }
            Err(e) => {
                error!(provider = %name, error = %e, "Failed to initialize LLM client");
                Self::unavailable(name, model, e.to_string())
            }
        }
    }

    pub fn from_adapter(
        provider_name: impl Into<String>,
        model: impl Into<String>,
        adapter: Box<dyn LLMAdapter>,
    ) -> Self {
        Self {
            adapter,
            provider_name: provider_name.into(),
            model: model.into(),
            available: true,
        }
    }

    pub fn unavailable(
        provider_name: impl Into<String>,
        model: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            adapter: Box::new(UnavailableAdapter { reason: reason.into() }),
            provider_name: provider_name.into(),
            model: model.into(),
            available: false,
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }

    /// Send one user prompt with this client's model and return the text.
    pub async fn complete(&self, prompt: &str, temperature: Option<f32>) -> AppResult<String> {
        let mut request = LLMRequest::user_prompt(&self.model, prompt);
        request.temperature = temperature;
        let response = self.create_chat_completion(&request).await?;
        Ok(response.content)
    }
}
