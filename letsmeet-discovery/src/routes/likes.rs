use std::collections::HashSet;

use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use letsmeet_shared::errors::{AppError, AppResult};
use letsmeet_shared::types::auth::AuthUser;
use letsmeet_shared::types::ApiResponse;

use crate::models::{Profile, ProfileCard};
use crate::schema::{profiles, swipes};
use crate::AppState;

/// GET /likes/received - profiles that liked the requester and have not been
/// swiped back yet. Premium clients render this as the "likes you" screen.
pub async fn received_likes(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ProfileCard>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let likers: Vec<Uuid> = swipes::table
        .filter(swipes::target_user_id.eq(user.id))
        .filter(swipes::action.eq_any(["like", "super_like"]))
        .select(swipes::user_id)
        .distinct()
        .load(&mut conn)?;

    let already_swiped: HashSet<Uuid> = swipes::table
        .filter(swipes::user_id.eq(user.id))
        .select(swipes::target_user_id)
        .load::<Uuid>(&mut conn)?
        .into_iter()
        .collect();

    let pending: Vec<Uuid> = likers
        .into_iter()
        .filter(|id| !already_swiped.contains(id))
        .collect();

    let cards: Vec<ProfileCard> = profiles::table
        .filter(profiles::user_id.eq_any(&pending))
        .filter(profiles::is_active.eq(true))
        .load::<Profile>(&mut conn)?
        .iter()
        .map(ProfileCard::from)
        .collect();

    Ok(Json(ApiResponse::ok(cards)))
}
