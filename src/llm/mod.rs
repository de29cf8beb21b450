//! Chat-completion access to the hosted models.
//!
//! Every flow goes through [`ChatModel`], so tests and alternative providers only need to
//! implement one method. [`LlmClient`] is the HTTP implementation for OpenAI-compatible
//! endpoints.

pub mod flows;
pub mod prompts;

use crate::config::LlmConfig;
use crate::error::{CopilotError, Result};
use crate::models::Role;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const LLM_API_TIMEOUT_SECS: u64 = 120;

/// One message of a chat-completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Output format requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// The reply must be a single JSON object
    Json,
}

/// A model that answers a list of chat messages with text
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends one request and returns the reply. Implementations never retry.
    async fn complete(&self, messages: &[PromptMessage], format: OutputFormat) -> Result<String>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {api_base}/chat/completions`
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(LLM_API_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, messages: &[PromptMessage], format: OutputFormat) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CopilotError::Config(format!("No API key configured for {}", self.api_base))
        })?;

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            response_format: match format {
                OutputFormat::Json => Some(json!({ "type": "json_object" })),
                OutputFormat::Text => None,
            },
        };

        let chars: usize = messages.iter().map(|m| m.content.len()).sum();
        info!("Calling {} with {} messages ({} chars)", self.model, messages.len(), chars);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Model error body: {}", body);
            return Err(CopilotError::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CopilotError::Llm(format!("Malformed completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CopilotError::Llm("The model returned no content".into()))
    }
}
