//! Pluggable local AI backend abstraction
//!
//! This module provides a backend-agnostic interface for the two advisory
//! contracts. All backends run locally (no cloud APIs) - Ollama,
//! OpenAI-compatible servers, or the mock backend.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! Backends return errors. Turning errors into fallback text is the job of
//! [`Advisor`](crate::advisor::Advisor).
//!
//! # Usage
//!
//! ```rust,ignore
//! if let Some(client) = AIClient::from_env() {
//!     let advice = client.spending_advice(&input).await?;
//!     println!("{}", advice.advice);
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Default model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::{MockBackend, MockMode};
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::config::{AdvisorConfig, TaskType};
use crate::error::{Error, Result};
use crate::prompts::{PromptId, PromptLibrary};

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Ask for personalized suggestions on reducing spending
    async fn spending_advice(&self, input: &SpendingAdvisorInput) -> Result<SpendingAdvice>;

    /// Ask for lifestyle advice and over-leveraging tips
    async fn lifestyle_guide(&self, input: &LifestyleGuideInput) -> Result<LifestyleGuide>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;

    /// Backend details for display
    fn backend_info(&self) -> BackendInfo;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
/// All variants implement the same AIBackend operations.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (Docker Model Runner, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Use the given advisor config for model overrides, temperature and currency
    pub fn with_config(self, config: Arc<AdvisorConfig>) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_config(config)),
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_config(config)),
            AIClient::Mock(b) => AIClient::Mock(b),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn spending_advice(&self, input: &SpendingAdvisorInput) -> Result<SpendingAdvice> {
        match self {
            AIClient::Ollama(b) => b.spending_advice(input).await,
            AIClient::OpenAICompatible(b) => b.spending_advice(input).await,
            AIClient::Mock(b) => b.spending_advice(input).await,
        }
    }

    async fn lifestyle_guide(&self, input: &LifestyleGuideInput) -> Result<LifestyleGuide> {
        match self {
            AIClient::Ollama(b) => b.lifestyle_guide(input).await,
            AIClient::OpenAICompatible(b) => b.lifestyle_guide(input).await,
            AIClient::Mock(b) => b.lifestyle_guide(input).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }

    fn backend_info(&self) -> BackendInfo {
        match self {
            AIClient::Ollama(b) => b.backend_info(),
            AIClient::OpenAICompatible(b) => b.backend_info(),
            AIClient::Mock(b) => b.backend_info(),
        }
    }
}

/// Render a prompt from the shared library
pub(crate) fn render_prompt(
    prompts: &RwLock<PromptLibrary>,
    id: PromptId,
    vars: &std::collections::HashMap<&str, String>,
) -> Result<RenderedPrompt> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    let template = prompts.get(id)?;
    Ok(RenderedPrompt {
        system: template.render_system(vars),
        user: template.render_user(vars),
    })
}

/// Task-specific models that differ from the backend default
pub(crate) fn task_models(config: &AdvisorConfig, default_model: &str) -> Vec<(String, String)> {
    TaskType::all()
        .iter()
        .filter_map(|task| {
            config
                .model_for_task(*task)
                .filter(|m| *m != default_model)
                .map(|m| (task.as_str().to_string(), m.to_string()))
        })
        .collect()
}
