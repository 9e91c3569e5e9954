use std::collections::HashSet;

use chrono::{Duration, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use letsmeet_shared::clients::db::DbPool;
use letsmeet_shared::errors::{AppError, AppResult, ErrorCode};

use crate::cache::{keys, DiscoveryCache};
use crate::discovery::ranking;
use crate::models::{CandidateProfile, Profile};
use crate::schema::{profiles, swipes};

/// Ranked feed for a user, read through the cache.
///
/// The SQL side only applies the cheap filters (active, not-self, premium or
/// recently active); eligibility, distance, ordering and truncation happen in
/// [`ranking`]. Feed reads never write swipe or match state.
pub async fn get_feed(
    pool: &DbPool,
    cache: &dyn DiscoveryCache,
    user_id: Uuid,
    limit: i64,
) -> AppResult<Vec<CandidateProfile>> {
    let cache_key = keys::feed(user_id, limit);
    if let Some(cached) = cache.get(&cache_key).await {
        match serde_json::from_str::<Vec<CandidateProfile>>(&cached) {
            Ok(feed) => {
                tracing::debug!(user_id = %user_id, limit, "feed cache hit");
                return Ok(feed);
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %cache_key, "discarding corrupt feed cache entry");
            }
        }
    }

    let feed: Vec<CandidateProfile> = {
        let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;
        let requester = load_requester(&mut conn, user_id)?;
        let swiped = swiped_user_ids(&mut conn, user_id)?;
        let candidates = load_candidate_rows(&mut conn, user_id)?;

        let now = Utc::now();
        let mut rng = rand::thread_rng();
        ranking::rank_candidates(&requester, candidates, &swiped, now, &mut rng)
            .into_iter()
            .take(limit as usize)
            .map(ranking::RankedCandidate::into_candidate_profile)
            .collect()
    };

    match serde_json::to_string(&feed) {
        Ok(json) => cache.set(&cache_key, &json, keys::FEED_TTL_SECS).await,
        Err(e) => tracing::error!(error = %e, "failed to serialize feed for caching"),
    }

    Ok(feed)
}

/// How many candidates are currently available to the user, read through the
/// cache. Applies the same eligibility filter as [`get_feed`].
pub async fn get_feed_count(
    pool: &DbPool,
    cache: &dyn DiscoveryCache,
    user_id: Uuid,
) -> AppResult<i64> {
    let cache_key = keys::feed_count(user_id);
    if let Some(cached) = cache.get(&cache_key).await {
        if let Ok(count) = cached.parse::<i64>() {
            tracing::debug!(user_id = %user_id, "feed count cache hit");
            return Ok(count);
        }
        tracing::warn!(key = %cache_key, "discarding corrupt feed count cache entry");
    }

    let count = {
        let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;
        let requester = load_requester(&mut conn, user_id)?;
        let swiped = swiped_user_ids(&mut conn, user_id)?;
        let candidates = load_candidate_rows(&mut conn, user_id)?;
        ranking::eligible_count(&requester, &candidates, &swiped, Utc::now())
    };

    cache
        .set(&cache_key, &count.to_string(), keys::FEED_COUNT_TTL_SECS)
        .await;

    Ok(count)
}

fn load_requester(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Profile> {
    profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<Profile>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Everyone the user has already swiped on, regardless of action.
fn swiped_user_ids(conn: &mut PgConnection, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
    let ids = swipes::table
        .filter(swipes::user_id.eq(user_id))
        .select(swipes::target_user_id)
        .load::<Uuid>(conn)?;
    Ok(ids.into_iter().collect())
}

fn load_candidate_rows(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<Profile>> {
    let activity_cutoff = Utc::now() - Duration::days(ranking::INACTIVITY_WINDOW_DAYS);
    let rows = profiles::table
        .filter(profiles::user_id.ne(user_id))
        .filter(profiles::is_active.eq(true))
        .filter(
            profiles::is_premium
                .eq(true)
                .or(profiles::last_active.ge(activity_cutoff)),
        )
        .load::<Profile>(conn)?;
    Ok(rows)
}
