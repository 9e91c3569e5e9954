use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use letsmeet_shared::clients::db::DbPool;
use letsmeet_shared::clients::rabbitmq::RabbitMQClient;
use letsmeet_shared::errors::{AppError, AppResult, ErrorCode};

use crate::cache::{self, keys, DiscoveryCache};
use crate::events::publisher;
use crate::models::{Match, MatchWithProfile, Profile, ProfileCard};
use crate::schema::{matches, profiles};

/// Active matches for a user with the other participant's card, read through
/// the cache.
pub async fn list_matches(
    pool: &DbPool,
    cache: &dyn DiscoveryCache,
    user_id: Uuid,
) -> AppResult<Vec<MatchWithProfile>> {
    let cache_key = keys::matches(user_id);
    if let Some(cached) = cache.get(&cache_key).await {
        match serde_json::from_str::<Vec<MatchWithProfile>>(&cached) {
            Ok(list) => {
                tracing::debug!(user_id = %user_id, "match list cache hit");
                return Ok(list);
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %cache_key, "discarding corrupt match list cache entry");
            }
        }
    }

    let list: Vec<MatchWithProfile> = {
        let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

        let mut rows: Vec<Match> = matches::table
            .filter(
                matches::user1_id
                    .eq(user_id)
                    .or(matches::user2_id.eq(user_id)),
            )
            .filter(matches::is_active.eq(true))
            .load(&mut conn)?;
        sort_for_inbox(&mut rows);

        let other_ids: Vec<Uuid> = rows.iter().map(|m| m.other_user(user_id)).collect();
        let others: Vec<Profile> = profiles::table
            .filter(profiles::user_id.eq_any(&other_ids))
            .load(&mut conn)?;
        let by_user: HashMap<Uuid, &Profile> = others.iter().map(|p| (p.user_id, p)).collect();

        rows.into_iter()
            .filter_map(|m| {
                let other = by_user.get(&m.other_user(user_id))?;
                Some(MatchWithProfile {
                    id: m.id,
                    matched_at: m.matched_at,
                    last_message_at: m.last_message_at,
                    other_user: ProfileCard::from(*other),
                })
            })
            .collect()
    };

    match serde_json::to_string(&list) {
        Ok(json) => cache.set(&cache_key, &json, keys::MATCHES_TTL_SECS).await,
        Err(e) => tracing::error!(error = %e, "failed to serialize match list for caching"),
    }

    Ok(list)
}

/// Most recent conversation first; matches without messages fall back to the
/// match date and sort after any conversation.
fn sort_for_inbox(rows: &mut [Match]) {
    rows.sort_by(|a, b| match (b.last_message_at, a.last_message_at) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| b.matched_at.cmp(&a.matched_at)),
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (None, None) => b.matched_at.cmp(&a.matched_at),
    });
}

/// Deactivate a match on behalf of one of its participants.
pub async fn unmatch(
    pool: &DbPool,
    cache: &dyn DiscoveryCache,
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    let row: Match = {
        let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

        let existing: Match = matches::table
            .find(match_id)
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

        if !existing.involves(user_id) {
            return Err(AppError::new(
                ErrorCode::NotMatchParticipant,
                "you are not a participant in this match",
            ));
        }

        diesel::update(matches::table.find(match_id))
            .set((
                matches::is_active.eq(false),
                matches::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)?
    };

    cache::invalidate_matches_for(cache, row.user1_id, row.user2_id).await;
    cache::invalidate_messages_for(cache, row.id).await;
    publisher::publish_match_ended(rabbitmq, &row, user_id).await;

    tracing::info!(match_id = %row.id, ended_by = %user_id, "match ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn row(matched_days_ago: i64, last_message_days_ago: Option<i64>) -> Match {
        let now = Utc::now();
        Match {
            id: Uuid::new_v4(),
            user1_id: Uuid::new_v4(),
            user2_id: Uuid::new_v4(),
            matched_at: now - Duration::days(matched_days_ago),
            last_message_at: last_message_days_ago.map(|d| now - Duration::days(d)),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn inbox_sorts_conversations_before_silent_matches() {
        let silent_recent = row(1, None);
        let old_conversation = row(30, Some(5));
        let fresh_conversation = row(20, Some(1));

        let mut rows = vec![silent_recent.clone(), old_conversation.clone(), fresh_conversation.clone()];
        sort_for_inbox(&mut rows);

        assert_eq!(rows[0].id, fresh_conversation.id);
        assert_eq!(rows[1].id, old_conversation.id);
        assert_eq!(rows[2].id, silent_recent.id);
    }

    #[test]
    fn silent_matches_sort_by_match_date() {
        let older = row(10, None);
        let newer = row(2, None);

        let mut rows = vec![older.clone(), newer.clone()];
        sort_for_inbox(&mut rows);

        assert_eq!(rows[0].id, newer.id);
        assert_eq!(rows[1].id, older.id);
    }
}
