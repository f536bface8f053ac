//! Async text-generation client
//!
//! Model-agnostic HTTP client for calling LLM APIs.
//! Supports both Anthropic and OpenAI-compatible APIs (DeepSeek, etc).
//! The pipeline only ever sees the [`TextGenerator`] trait, so tests and
//! hosts can swap in their own collaborator.

use crate::core::error::{AssistError, CollaboratorFailure, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One completion call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// System prompt providing context and instructions
    pub system: String,
    /// User message to complete
    pub prompt: String,
    /// Overrides the client's configured model
    pub model_hint: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_hint = Some(model.into());
        self
    }
}

/// External text-generation collaborator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `request`, returning the raw generated text
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, CollaboratorFailure>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

/// Call `generator` with a hard deadline; elapsing maps to `Timeout`
pub async fn with_timeout(
    generator: &dyn TextGenerator,
    request: &CompletionRequest,
    limit: Duration,
) -> std::result::Result<String, CollaboratorFailure> {
    match tokio::time::timeout(limit, generator.complete(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                "{} did not answer within {:?}",
                generator.model_name(),
                limit
            );
            Err(CollaboratorFailure::Timeout)
        }
    }
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| AssistError::Config("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".into());

        Ok(Self::new(api_key, api_url, model))
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    async fn complete_anthropic(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, CollaboratorFailure> {
        let body = AnthropicRequest {
            model: self.model_for(request),
            max_tokens: request.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            system: request.system.clone(),
            messages: vec![Message {
                role: "user".into(),
                content: request.prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_text));
        }

        let completion: AnthropicResponse = response.json().await.map_err(transport_failure)?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| CollaboratorFailure::Other("Empty response".into()))
    }

    async fn complete_openai(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, CollaboratorFailure> {
        let body = OpenAIRequest {
            model: self.model_for(request),
            max_tokens: request.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: request.system.clone(),
                },
                Message {
                    role: "user".into(),
                    content: request.prompt.clone(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_text));
        }

        let completion: OpenAIResponse = response.json().await.map_err(transport_failure)?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| CollaboratorFailure::Other("Empty response".into()))
    }

    fn model_for(&self, request: &CompletionRequest) -> String {
        request
            .model_hint
            .clone()
            .unwrap_or_else(|| self.model.clone())
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, CollaboratorFailure> {
        let result = match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(request).await,
            ApiFormat::OpenAI => self.complete_openai(request).await,
        };
        if let Err(failure) = &result {
            tracing::warn!("LLM call to {} failed: {}", self.model, failure);
        }
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn transport_failure(e: reqwest::Error) -> CollaboratorFailure {
    if e.is_timeout() {
        CollaboratorFailure::Timeout
    } else {
        CollaboratorFailure::Other(e.to_string())
    }
}

/// Map a non-success HTTP status to the collaborator failure taxonomy
pub fn classify_status(status: StatusCode, body: &str) -> CollaboratorFailure {
    let lower = body.to_lowercase();
    match status {
        StatusCode::TOO_MANY_REQUESTS if lower.contains("quota") || lower.contains("billing") => {
            CollaboratorFailure::QuotaExceeded
        }
        StatusCode::TOO_MANY_REQUESTS => CollaboratorFailure::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CollaboratorFailure::InvalidCredential,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => CollaboratorFailure::Timeout,
        _ => CollaboratorFailure::Other(format!("API error {}: {}", status, body)),
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
