//! DSL content endpoint handlers.

use axum::{extract::State, Json};

use crate::api::error::ApiResult;
use crate::api::models::{DslContent, DslUpdateResponse};
use crate::api::routes::AppState;

/// Handler for `GET /dsl/content`: the workflow document as stored on
/// disk.
pub async fn get_dsl_content(State(state): State<AppState>) -> ApiResult<Json<DslContent>> {
    let content = state.service.dsl_content().await?;
    Ok(Json(DslContent { content }))
}

/// Handler for `POST /dsl/content`: validate, persist, and hot-swap the
/// workflow document. An invalid document is rejected with 400 and the
/// running workflow is left unchanged.
pub async fn update_dsl_content(
    State(state): State<AppState>,
    Json(body): Json<DslContent>,
) -> ApiResult<Json<DslUpdateResponse>> {
    state.service.reload(&body.content).await?;
    Ok(Json(DslUpdateResponse {
        status: "ok".to_string(),
        message: "DSL updated and reloaded".to_string(),
    }))
}
