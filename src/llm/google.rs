// Google Gemini adapter (generateContent REST API)

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for the writer and editor stages
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub struct GoogleAdapter {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GoogleAdapter {
    pub fn new(api_key: &str) -> Self {
        Self::new_with_api_base(api_key, GEMINI_API_BASE)
    }

    pub fn new_with_api_base(api_key: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    fn build_request(request: &LLMRequest) -> GenerateRequest {
        let system_text: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect();

        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| Content {
                // Gemini names the assistant turn "model"
                role: Some(if m.role == "assistant" { "model" } else { "user" }.to_string()),
                parts: vec![Part { text: m.content.clone() }],
            })
            .collect();

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GenerateRequest {
            contents,
            system_instruction: if system_text.is_empty() {
                None
            } else {
                Some(Content {
                    role: None,
                    parts: vec![Part { text: system_text.join("\n\n") }],
                })
            },
            generation_config,
        }
    }
}

#[async_trait]
impl LLMAdapter for GoogleAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let body = Self::build_request(request);

        let response = self
            .client
            .post(self.generate_url(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMApi(format!("Gemini API error ({}): {}", status, error_text)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Gemini response: {}", e)))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMApi("Gemini returned no candidates".to_string()))?;

        let content = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        let usage = parsed
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content,
            finish_reason: candidate.finish_reason.unwrap_or_else(|| "STOP".to_string()),
            usage,
        })
    }
}
