//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use spendwise_core::{AIBackend, BackendInfo};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai: AiHealth,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHealth {
    pub configured: bool,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendInfo>,
}

/// GET /api/health - Server and AI backend status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai = match &state.advisor {
        Some(advisor) => AiHealth {
            configured: true,
            healthy: advisor.client().health_check().await,
            backend: Some(advisor.client().backend_info()),
        },
        None => AiHealth {
            configured: false,
            healthy: false,
            backend: None,
        },
    };

    Json(HealthResponse { status: "ok", ai })
}
