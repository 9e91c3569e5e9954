use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use letsmeet_shared::errors::{AppError, AppResult, ErrorCode};
use letsmeet_shared::types::auth::AuthUser;
use letsmeet_shared::types::ApiResponse;

use crate::models::CandidateProfile;
use crate::services::feed_service;
use crate::AppState;

const DEFAULT_FEED_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    limit: Option<i64>,
}

/// GET /feed?limit=20 - ranked candidate profiles for the requester
pub async fn get_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> AppResult<Json<ApiResponse<Vec<CandidateProfile>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    if !(1..=100).contains(&limit) {
        return Err(AppError::new(
            ErrorCode::InvalidFeedLimit,
            "limit must be between 1 and 100",
        ));
    }

    let feed = feed_service::get_feed(&state.db, state.cache.as_ref(), user.id, limit).await?;
    Ok(Json(ApiResponse::ok(feed)))
}

#[derive(Debug, Serialize)]
pub struct FeedCountResponse {
    pub count: i64,
}

/// GET /feed/count - how many profiles are available to swipe on
pub async fn get_feed_count(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<FeedCountResponse>>> {
    let count = feed_service::get_feed_count(&state.db, state.cache.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::ok(FeedCountResponse { count })))
}
