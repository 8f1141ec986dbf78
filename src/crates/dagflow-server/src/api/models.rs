//! Request and response bodies for the HTTP surface.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Response of `POST /chat/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub response: String,
}

/// One message in `GET /chat/history/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub role: String,
    pub content: String,
}

/// Body and response of the DSL content endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DslContent {
    pub content: String,
}

/// Response of `POST /dsl/content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DslUpdateResponse {
    pub status: String,
    pub message: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub workflow_loaded: bool,
}
