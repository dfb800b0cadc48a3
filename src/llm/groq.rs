use crate::llm::openai::OpenAIAdapter;
use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default model for the research-side stages
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

pub struct GroqAdapter {
    inner: OpenAIAdapter,
}

impl GroqAdapter {
    pub fn new(api_key: &str) -> Self {
        Self::new_with_api_base(api_key, GROQ_API_BASE)
    }

    pub fn new_with_api_base(api_key: &str, api_base: &str) -> Self {
        Self {
            inner: OpenAIAdapter::new_with_api_base(api_key, api_base),
        }
    }
}

#[async_trait]
impl LLMAdapter for GroqAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.inner.create_chat_completion(request).await
    }
}
