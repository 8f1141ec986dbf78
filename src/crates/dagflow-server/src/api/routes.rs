//! API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::service::WorkflowService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WorkflowService>,
}

/// Build the complete API router.
pub fn create_router(service: Arc<WorkflowService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/chat/send", post(handlers::send_message))
        .route("/chat/history/:conversation_id", get(handlers::get_history))
        .route(
            "/dsl/content",
            get(handlers::get_dsl_content).post(handlers::update_dsl_content),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
