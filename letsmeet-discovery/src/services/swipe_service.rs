use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use letsmeet_shared::clients::db::DbPool;
use letsmeet_shared::clients::rabbitmq::RabbitMQClient;
use letsmeet_shared::errors::{AppError, AppResult, ErrorCode};

use crate::cache::{self, DiscoveryCache};
use crate::events::publisher;
use crate::models::{canonical_pair, Match, NewMatch, NewSwipe, Profile, Swipe, SwipeAction};
use crate::schema::{matches, profiles, swipes};
use crate::services::quota;

#[derive(Debug, Serialize)]
pub struct SwipeOutcome {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
}

/// Record a swipe and detect reciprocity.
///
/// The swipe insert, the reciprocal-like lookup and the match upsert run in
/// one transaction with no await points in between, so a client disconnect
/// commits all of it or none of it. Uniqueness of both the swipe pair and the
/// canonical match pair is enforced by Postgres constraints, not in-process
/// checks.
pub async fn record_swipe(
    pool: &DbPool,
    cache: &dyn DiscoveryCache,
    rabbitmq: &RabbitMQClient,
    actor_id: Uuid,
    target_id: Uuid,
    action: SwipeAction,
) -> AppResult<SwipeOutcome> {
    if actor_id == target_id {
        return Err(AppError::new(
            ErrorCode::CannotSwipeSelf,
            "cannot swipe on yourself",
        ));
    }

    let (outcome, created_match) = {
        let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

        let actor = profiles::table
            .filter(profiles::user_id.eq(actor_id))
            .first::<Profile>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

        let target_exists = diesel::select(diesel::dsl::exists(
            profiles::table.filter(profiles::user_id.eq(target_id)),
        ))
        .get_result::<bool>(&mut conn)?;
        if !target_exists {
            return Err(AppError::new(
                ErrorCode::ProfileNotFound,
                "target profile not found",
            ));
        }

        // Quota gate. Passes are exempt, premium users skip the count query
        // entirely.
        if action.is_like() && !actor.is_premium {
            let count = quota::today_like_count(&mut conn, actor_id, Utc::now())?;
            if !quota::within_daily_limit(count) {
                return Err(AppError::with_details(
                    ErrorCode::SwipeLimitReached,
                    "daily swipe limit reached, upgrade to premium for unlimited swipes",
                    serde_json::json!({ "limit": quota::FREE_DAILY_SWIPE_LIMIT }),
                ));
            }
        }

        conn.transaction::<_, AppError, _>(|conn| {
            let inserted = diesel::insert_into(swipes::table)
                .values(&NewSwipe {
                    user_id: actor_id,
                    target_user_id: target_id,
                    action: action.to_string(),
                })
                .on_conflict_do_nothing()
                .get_result::<Swipe>(conn)
                .optional()?;

            if inserted.is_none() {
                return Err(AppError::new(
                    ErrorCode::DuplicateSwipe,
                    "already swiped on this profile",
                ));
            }

            // passes never create matches
            if !action.is_like() {
                return Ok((
                    SwipeOutcome {
                        matched: false,
                        match_id: None,
                    },
                    None,
                ));
            }

            let reciprocal = diesel::select(diesel::dsl::exists(
                swipes::table
                    .filter(swipes::user_id.eq(target_id))
                    .filter(swipes::target_user_id.eq(actor_id))
                    .filter(swipes::action.eq_any(["like", "super_like"])),
            ))
            .get_result::<bool>(conn)?;

            if !reciprocal {
                return Ok((
                    SwipeOutcome {
                        matched: false,
                        match_id: None,
                    },
                    None,
                ));
            }

            let row = upsert_match(conn, actor_id, target_id)?;
            Ok((
                SwipeOutcome {
                    matched: true,
                    match_id: Some(row.id),
                },
                Some(row),
            ))
        })?
    };

    // Post-commit coherency and events: fail-open, but awaited before the
    // handler returns.
    cache::invalidate_feed_for(cache, actor_id).await;
    publisher::publish_swipe_recorded(rabbitmq, actor_id, target_id, action).await;

    if let Some(row) = created_match {
        tracing::info!(
            match_id = %row.id,
            user1_id = %row.user1_id,
            user2_id = %row.user2_id,
            "mutual like detected, match active"
        );
        cache::invalidate_matches_for(cache, row.user1_id, row.user2_id).await;
        let reactivated = row.updated_at != row.created_at;
        publisher::publish_match_created(rabbitmq, &row, reactivated).await;
    }

    Ok(outcome)
}

/// Insert-or-reactivate on the canonical pair, as one atomic statement.
///
/// Concurrent reciprocal swipes both land here; the unique constraint on
/// (user1_id, user2_id) guarantees at most one row per unordered pair, and an
/// inactive row from an earlier unmatch is flipped back on instead of
/// duplicated.
fn upsert_match(conn: &mut PgConnection, actor_id: Uuid, target_id: Uuid) -> AppResult<Match> {
    let (user1_id, user2_id) = canonical_pair(actor_id, target_id);
    let now = Utc::now();

    let row = diesel::insert_into(matches::table)
        .values(&NewMatch {
            user1_id,
            user2_id,
            matched_at: now,
        })
        .on_conflict((matches::user1_id, matches::user2_id))
        .do_update()
        .set((matches::is_active.eq(true), matches::updated_at.eq(now)))
        .get_result::<Match>(conn)?;

    Ok(row)
}
