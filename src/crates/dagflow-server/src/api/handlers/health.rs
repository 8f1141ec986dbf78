//! Health check endpoint handler.

use axum::{extract::State, Json};

use crate::api::models::HealthResponse;
use crate::api::routes::AppState;

/// Handler for `GET /health`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        workflow_loaded: state.service.workflow_loaded().await,
    })
}
