//! Test utilities for spendwise-core
//!
//! This module provides a mock text-generation server speaking both the
//! Ollama and OpenAI-compatible APIs, for development and integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::oneshot;

/// How the mock server answers generation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Contract-shaped JSON wrapped in a little chatter
    Valid,
    /// JSON with the last required field dropped
    MissingField,
    /// HTTP 500
    ServerError,
    /// Sleep this long before answering
    Stall(Duration),
}

#[derive(Clone)]
struct ServerState {
    mode: GenerationMode,
    prompts: Arc<Mutex<Vec<String>>>,
}

/// Mock generation server for testing and development
pub struct MockGenerationServer {
    addr: SocketAddr,
    prompts: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGenerationServer {
    /// Start a server that answers every request correctly
    pub async fn start() -> Self {
        Self::start_with_mode(GenerationMode::Valid).await
    }

    /// Start the mock server on an available port
    pub async fn start_with_mode(mode: GenerationMode) -> Self {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            mode,
            prompts: prompts.clone(),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            prompts,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// User prompts received so far, in arrival order
    pub fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGenerationServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<serde_json::Value> {
    Json(json!({
        "models": [{
            "name": "llama3.2:latest",
            "modified_at": "2024-01-01T00:00:00Z",
            "size": 4_000_000_000u64
        }]
    }))
}

/// OpenAI models endpoint (health check)
async fn handle_models() -> Json<serde_json::Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "llama3.2", "object": "model"}]
    }))
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<ServerState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    match answer(&state, &request.prompt).await {
        Ok(response) => Json(GenerateResponse {
            model: request.model,
            response,
            done: true,
        })
        .into_response(),
        Err(status) => (status, "mock generation failure").into_response(),
    }
}

/// OpenAI chat completions endpoint
async fn handle_chat(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
        .unwrap_or_default();

    match answer(&state, &prompt).await {
        Ok(content) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": request.model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Err(status) => (status, "mock generation failure").into_response(),
    }
}

/// Pick the contract from the prompt text and build the reply
async fn answer(state: &ServerState, prompt: &str) -> Result<String, StatusCode> {
    state.prompts.lock().unwrap().push(prompt.to_string());

    match state.mode {
        GenerationMode::ServerError => return Err(StatusCode::INTERNAL_SERVER_ERROR),
        GenerationMode::Stall(delay) => tokio::time::sleep(delay).await,
        GenerationMode::Valid | GenerationMode::MissingField => {}
    }
    let complete = state.mode != GenerationMode::MissingField;

    let body = if prompt.contains("overLeveragingTips") {
        if complete {
            json!({
                "lifestyleAdvice": "Keep dining out to weekends and cook in bulk.",
                "overLeveragingTips": "Hold EMIs below a third of income before taking new credit."
            })
        } else {
            json!({"lifestyleAdvice": "Keep dining out to weekends and cook in bulk."})
        }
    } else if complete {
        json!({"advice": "Groceries are your largest category; plan meals weekly to cut it by 15%."})
    } else {
        json!({"tips": "Spend less."})
    };

    Ok(format!("Here is the JSON you asked for:\n{}\n", body))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{Advisor, LIFESTYLE_ADVICE_FALLBACK, SPENDING_ADVICE_FALLBACK};
    use crate::ai::{
        AIBackend, AIClient, LifestyleGuideInput, OllamaBackend, OpenAICompatibleBackend,
        SpendingAdvisorInput, NO_SPENDING_DATA,
    };
    use crate::config::AdvisorConfig;
    use crate::error::Error;
    use crate::prompts::PromptLibrary;

    fn ollama(server: &MockGenerationServer) -> OllamaBackend {
        OllamaBackend::new(&server.url(), "test-model").with_prompts(PromptLibrary::embedded_only())
    }

    fn spending_input(data: &str) -> SpendingAdvisorInput {
        SpendingAdvisorInput {
            spending_data: data.to_string(),
            income: 75000.0,
            fixed_expenses: 30000.0,
            savings_goal: 10000.0,
            emi_payments: 15000.0,
        }
    }

    fn lifestyle_input() -> LifestyleGuideInput {
        LifestyleGuideInput {
            spending_power: 20000.0,
            total_monthly_expenses: 42000.0,
            income_to_debt_ratio: 0.2,
        }
    }

    fn advisor(client: OllamaBackend, timeout: Duration) -> Advisor {
        let config = AdvisorConfig::embedded().unwrap().with_timeout(timeout);
        Advisor::new(AIClient::Ollama(client), config)
    }

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockGenerationServer::start().await;
        assert!(ollama(&server).health_check().await);

        let openai = OpenAICompatibleBackend::new(&server.url(), "test-model");
        assert!(openai.health_check().await);
    }

    #[tokio::test]
    async fn test_ollama_spending_advice() {
        let server = MockGenerationServer::start().await;
        let client = ollama(&server);

        let result = client
            .spending_advice(&spending_input("Groceries: 12000, Dining Out: 8000"))
            .await
            .unwrap();
        assert!(result.advice.contains("Groceries"));

        let prompts = server.received_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Monthly Income: 75000"));
        assert!(prompts[0].contains("Dining Out: 8000"));
    }

    #[tokio::test]
    async fn test_empty_spending_data_sends_placeholder() {
        let server = MockGenerationServer::start().await;
        ollama(&server)
            .spending_advice(&spending_input("  "))
            .await
            .unwrap();

        assert!(server.received_prompts()[0].contains(NO_SPENDING_DATA));
    }

    #[tokio::test]
    async fn test_openai_compatible_lifestyle_guide() {
        let server = MockGenerationServer::start().await;
        let client = OpenAICompatibleBackend::new(&server.url(), "test-model")
            .with_prompts(PromptLibrary::embedded_only());

        let result = client.lifestyle_guide(&lifestyle_input()).await.unwrap();
        assert!(!result.lifestyle_advice.is_empty());
        assert!(!result.over_leveraging_tips.is_empty());
        assert!(server.received_prompts()[0].contains("Spending Power: 20000"));
    }

    #[tokio::test]
    async fn test_missing_field_is_invalid_response() {
        let server = MockGenerationServer::start_with_mode(GenerationMode::MissingField).await;
        let err = ollama(&server)
            .lifestyle_guide(&lifestyle_input())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_http_error() {
        let server = MockGenerationServer::start_with_mode(GenerationMode::ServerError).await;
        let err = ollama(&server)
            .spending_advice(&spending_input(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_advisor_falls_back_on_server_error() {
        let server = MockGenerationServer::start_with_mode(GenerationMode::ServerError).await;
        let advisor = advisor(ollama(&server), Duration::from_secs(5));

        let result = advisor.spending_advice(&spending_input("")).await.unwrap();
        assert!(result.is_fallback());
        assert_eq!(result.value.advice, SPENDING_ADVICE_FALLBACK);
    }

    #[tokio::test]
    async fn test_advisor_falls_back_on_missing_field() {
        let server = MockGenerationServer::start_with_mode(GenerationMode::MissingField).await;
        let advisor = advisor(ollama(&server), Duration::from_secs(5));

        let result = advisor.lifestyle_guide(&lifestyle_input()).await.unwrap();
        assert!(result.is_fallback());
        assert_eq!(result.value.lifestyle_advice, LIFESTYLE_ADVICE_FALLBACK);
    }

    #[tokio::test]
    async fn test_advisor_falls_back_on_stall() {
        let server =
            MockGenerationServer::start_with_mode(GenerationMode::Stall(Duration::from_secs(5)))
                .await;
        let advisor = advisor(ollama(&server), Duration::from_millis(200));

        let result = advisor.spending_advice(&spending_input("")).await.unwrap();
        assert!(result.is_fallback());
    }

    #[tokio::test]
    async fn test_advisor_falls_back_when_unreachable() {
        let client = OllamaBackend::new("http://127.0.0.1:9", "test-model")
            .with_prompts(PromptLibrary::embedded_only());
        let advisor = advisor(client, Duration::from_secs(5));

        let result = advisor.lifestyle_guide(&lifestyle_input()).await.unwrap();
        assert!(result.is_fallback());
    }
}
