//! Chat endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::error::ApiResult;
use crate::api::models::{ChatRequest, ChatResponse, MessageView};
use crate::api::routes::AppState;

/// Handler for `POST /chat/send`.
///
/// Runs one chat turn of the loaded workflow and returns the reply
/// together with the (possibly newly created) conversation id.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let (conversation_id, response) = state
        .service
        .chat_turn(&request.query, request.conversation_id)
        .await?;

    Ok(Json(ChatResponse {
        conversation_id,
        response,
    }))
}

/// Handler for `GET /chat/history/{conversation_id}`.
pub async fn get_history(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<Vec<MessageView>>> {
    let messages = state.service.conversation_history(&conversation_id).await?;
    Ok(Json(
        messages
            .into_iter()
            .map(|m| MessageView {
                role: m.role,
                content: m.content,
            })
            .collect(),
    ))
}
