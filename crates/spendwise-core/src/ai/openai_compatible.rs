//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - Docker Model Runner (http://localhost:12434)
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AdvisorConfig, TaskType};
use crate::error::{Error, Result};
use crate::prompts::{PromptId, PromptLibrary};

use super::parsing::parse_json_response;
use super::types::{
    BackendInfo, LifestyleGuide, LifestyleGuideInput, RenderedPrompt, SpendingAdvice,
    SpendingAdvisorInput,
};
use super::{render_prompt, task_models, AIBackend};

/// Upper bound on generated tokens; 200 words fits comfortably
const MAX_TOKENS: u32 = 1024;

/// OpenAI-compatible backend
///
/// # Example
///
/// ```rust,ignore
/// // Docker Model Runner
/// export OPENAI_COMPATIBLE_HOST="http://localhost:12434"
/// export OPENAI_COMPATIBLE_MODEL="llama3.2"
///
/// // vLLM
/// export OPENAI_COMPATIBLE_HOST="http://192.168.1.100:8000"
/// export OPENAI_COMPATIBLE_MODEL="meta-llama/Llama-3.2-3B-Instruct"
/// ```
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    config: Arc<AdvisorConfig>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            config: Arc::new(AdvisorConfig::load().unwrap_or_default()),
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    pub fn with_config(self, config: Arc<AdvisorConfig>) -> Self {
        Self { config, ..self }
    }

    pub fn with_prompts(self, prompts: PromptLibrary) -> Self {
        Self {
            prompts: Arc::new(RwLock::new(prompts)),
            ..self
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL` (default: gpt-3.5-turbo)
    /// Optional: `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let mut backend = Self::new(&host, &model);
        backend.api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();
        Some(backend)
    }

    /// Make a chat completion request
    async fn chat_completion(&self, task: TaskType, prompt: RenderedPrompt) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.user,
        });

        let request = ChatCompletionRequest {
            model: self
                .config
                .model_for_task(task)
                .unwrap_or(&self.model)
                .to_string(),
            messages,
            temperature: Some(self.config.for_task(task).temperature),
            max_tokens: Some(MAX_TOKENS),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?.error_for_status()?;
        let chat_response: ChatCompletionResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::InvalidResponse("No choices in chat completion".into()))?;

        debug!(task = %task, "OpenAI-compatible response: {}", content);
        Ok(content)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn spending_advice(&self, input: &SpendingAdvisorInput) -> Result<SpendingAdvice> {
        let vars = input.prompt_vars(self.config.currency.as_deref());
        let prompt = render_prompt(&self.prompts, PromptId::SpendingAdvisor, &vars)?;
        let response = self.chat_completion(TaskType::SpendingAdvice, prompt).await?;
        parse_json_response(&response, "spending advice")
    }

    async fn lifestyle_guide(&self, input: &LifestyleGuideInput) -> Result<LifestyleGuide> {
        let vars = input.prompt_vars(self.config.currency.as_deref());
        let prompt = render_prompt(&self.prompts, PromptId::LifestyleGuide, &vars)?;
        let response = self.chat_completion(TaskType::LifestyleGuide, prompt).await?;
        parse_json_response(&response, "lifestyle guide")
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            backend: "openai_compatible",
            host: self.base_url.clone(),
            model: self.model.clone(),
            task_models: task_models(&self.config, &self.model),
        }
    }
}
