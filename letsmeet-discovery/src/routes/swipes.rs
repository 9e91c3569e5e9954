use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use letsmeet_shared::errors::{AppError, AppResult, ErrorCode};
use letsmeet_shared::types::auth::AuthUser;
use letsmeet_shared::types::ApiResponse;

use crate::models::{Profile, SwipeAction};
use crate::schema::profiles;
use crate::services::quota::{self, SwipeStats};
use crate::services::swipe_service::{self, SwipeOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordSwipeRequest {
    pub target_user_id: Uuid,
    pub action: String,
}

/// POST /swipes - record a like/pass/super_like and report any match
pub async fn record_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordSwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeOutcome>>> {
    let action: SwipeAction = req.action.parse()?;

    let outcome = swipe_service::record_swipe(
        &state.db,
        state.cache.as_ref(),
        &state.rabbitmq,
        user.id,
        req.target_user_id,
        action,
    )
    .await?;

    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /swipes/stats - today's like count and the requester's limit, if any
pub async fn swipe_stats(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<SwipeStats>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let count = quota::today_like_count(&mut conn, user.id, Utc::now())?;
    let stats = SwipeStats {
        count,
        limit: quota::limit_for(profile.is_premium),
    };

    Ok(Json(ApiResponse::ok(stats)))
}
