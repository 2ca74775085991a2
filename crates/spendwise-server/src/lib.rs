//! Spendwise Web Server
//!
//! Axum-based REST API over a single in-memory session snapshot.
//!
//! - Snapshot editing (income, fixed expenses, savings goals, EMIs, expenses)
//! - Dashboard figures and standalone calculators
//! - Advisory endpoints with one call in flight per contract
//! - Restrictive CORS policy and security headers
//! - Sanitized error responses
//!
//! There is no authentication; bind to localhost.

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use spendwise_core::{
    AIBackend, AIClient, Advisor, AdvisorConfig, AdvisorySlot, FinancialSnapshot, LifestyleGuide,
    SpendingAdvice,
};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    /// The session's financial data
    pub snapshot: RwLock<FinancialSnapshot>,
    /// None when no AI backend is configured; advice then falls back
    pub advisor: Option<Advisor>,
    pub spending_advice: AdvisorySlot<SpendingAdvice>,
    pub lifestyle_guide: AdvisorySlot<LifestyleGuide>,
}

impl AppState {
    pub fn new(snapshot: FinancialSnapshot, advisor: Option<Advisor>) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            advisor,
            spending_advice: AdvisorySlot::new(),
            lifestyle_guide: AdvisorySlot::new(),
        }
    }
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Build an advisor from the environment and the advisor config file
pub fn advisor_from_env() -> Option<Advisor> {
    let client = AIClient::from_env()?;
    let config = match AdvisorConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Invalid advisor config, using defaults");
            AdvisorConfig::default()
        }
    };

    let advisor = Advisor::new(client, config);
    let info = advisor.client().backend_info();
    info!(
        "AI backend configured: {} at {} (default model: {})",
        info.backend, info.host, info.model
    );
    // Log task-specific model assignments
    for (task, model) in &info.task_models {
        info!("  - {}: {}", task, model);
    }

    Some(advisor)
}

/// Create the application router
pub fn create_router(
    snapshot: FinancialSnapshot,
    advisor: Option<Advisor>,
    config: ServerConfig,
) -> Router {
    if advisor.is_none() {
        info!("ℹ️  AI backend not configured (set OLLAMA_HOST to enable advice)");
    }

    let state = Arc::new(AppState::new(snapshot, advisor));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Snapshot
        .route("/snapshot", get(handlers::get_snapshot))
        .route("/snapshot/income", put(handlers::set_income))
        .route("/fixed-expenses", post(handlers::add_fixed_expense))
        .route("/fixed-expenses/:id", delete(handlers::remove_fixed_expense))
        .route("/savings-goals", post(handlers::add_savings_goal))
        .route("/savings-goals/:id", delete(handlers::remove_savings_goal))
        .route("/emis", post(handlers::add_emi))
        .route("/emis/:id", delete(handlers::remove_emi))
        .route("/expenses", post(handlers::add_expense))
        .route("/expenses/:id", delete(handlers::remove_expense))
        // Derived figures
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/expenses/breakdown", get(handlers::get_breakdown))
        // Calculators
        .route(
            "/calculate/spending-power",
            post(handlers::calculate_spending_power),
        )
        .route("/calculate/analysis", post(handlers::calculate_analysis))
        // Advice
        .route(
            "/advice/spending",
            get(handlers::get_spending_advice).post(handlers::request_spending_advice),
        )
        .route(
            "/advice/lifestyle",
            get(handlers::get_lifestyle_guide).post(handlers::request_lifestyle_guide),
        );

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
pub async fn serve(
    snapshot: FinancialSnapshot,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let advisor = advisor_from_env();
    check_ai_connection(advisor.as_ref()).await;

    let app = create_router(snapshot, advisor, config);
    let addr = format!("{}:{}", host, port);

    if host != "127.0.0.1" && host != "localhost" {
        warn!("⚠️  No authentication - do not expose to an untrusted network!");
    }
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(advisor: Option<&Advisor>) {
    let Some(advisor) = advisor else {
        return;
    };
    let client = advisor.client();

    if client.health_check().await {
        info!("✅ AI backend connected: {} ({})", client.host(), client.model());
    } else {
        warn!(
            "⚠️  AI backend configured but not responding: {} ({})",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes are reported as-is; everything else stays generic
        if let Some(core) = err.downcast_ref::<spendwise_core::Error>() {
            if core.is_validation() {
                return Self::bad_request(&core.to_string());
            }
            if let spendwise_core::Error::NotFound(what) = core {
                return Self::not_found(&format!("{} not found", what));
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

/// Unwrap a JSON body, reporting malformed input as 400
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(&rejection.body_text()))
}

#[cfg(test)]
mod tests;
