//! Ollama backend implementation
//!
//! HTTP client for the Ollama API. Uses the advisor config for per-task model
//! selection and the prompt library for customizable prompts.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AdvisorConfig, TaskType};
use crate::error::Result;
use crate::prompts::{PromptId, PromptLibrary};

use super::parsing::parse_json_response;
use super::types::{
    BackendInfo, LifestyleGuide, LifestyleGuideInput, RenderedPrompt, SpendingAdvice,
    SpendingAdvisorInput,
};
use super::{render_prompt, task_models, AIBackend};

/// Ollama backend
///
/// # Configuration
///
/// Per-task models are read from `~/.local/share/spendwise/config/advisor.toml`:
///
/// ```toml
/// [defaults]
/// model = "llama3.2"
///
/// [tasks.lifestyle_guide]
/// model = "qwen2.5:7b"
/// timeout_secs = 90
/// ```
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    default_model: String,
    config: Arc<AdvisorConfig>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, default_model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.to_string(),
            config: Arc::new(AdvisorConfig::load().unwrap_or_default()),
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
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
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    fn model_for(&self, task: TaskType) -> &str {
        self.config
            .model_for_task(task)
            .unwrap_or(&self.default_model)
    }

    /// Send one non-streaming generate request and return the raw text
    async fn generate(&self, task: TaskType, prompt: RenderedPrompt) -> Result<String> {
        let request = OllamaRequest {
            model: self.model_for(task).to_string(),
            prompt: prompt.user,
            system: prompt.system,
            format: "json",
            stream: false,
            options: OllamaOptions {
                temperature: self.config.for_task(task).temperature,
            },
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(task = %task, "Ollama response: {}", ollama_response.response);

        Ok(ollama_response.response)
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    format: &'static str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn spending_advice(&self, input: &SpendingAdvisorInput) -> Result<SpendingAdvice> {
        let vars = input.prompt_vars(self.config.currency.as_deref());
        let prompt = render_prompt(&self.prompts, PromptId::SpendingAdvisor, &vars)?;
        let response = self.generate(TaskType::SpendingAdvice, prompt).await?;
        parse_json_response(&response, "spending advice")
    }

    async fn lifestyle_guide(&self, input: &LifestyleGuideInput) -> Result<LifestyleGuide> {
        let vars = input.prompt_vars(self.config.currency.as_deref());
        let prompt = render_prompt(&self.prompts, PromptId::LifestyleGuide, &vars)?;
        let response = self.generate(TaskType::LifestyleGuide, prompt).await?;
        parse_json_response(&response, "lifestyle guide")
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.default_model
    }

    fn host(&self) -> &str {
        &self.base_url
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            backend: "ollama",
            host: self.base_url.clone(),
            model: self.default_model.clone(),
            task_models: task_models(&self.config, &self.default_model),
        }
    }
}
