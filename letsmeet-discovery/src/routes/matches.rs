use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use letsmeet_shared::errors::AppResult;
use letsmeet_shared::types::auth::AuthUser;
use letsmeet_shared::types::ApiResponse;

use crate::models::MatchWithProfile;
use crate::services::match_service;
use crate::AppState;

/// GET /matches - the requester's active matches, most recent activity first
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchWithProfile>>>> {
    let list = match_service::list_matches(&state.db, state.cache.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::ok(list)))
}

/// DELETE /matches/:id - end a match the requester participates in
pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    match_service::unmatch(
        &state.db,
        state.cache.as_ref(),
        &state.rabbitmq,
        match_id,
        user.id,
    )
    .await?;

    Ok(Json(ApiResponse::ok_with_message((), "unmatched")))
}
