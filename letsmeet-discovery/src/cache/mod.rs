//! Fail-open read-through cache in front of feed and match reads.
//!
//! The cache is never load-bearing: a read error degrades to a miss, a write
//! or invalidation error is logged and swallowed. Correctness always comes
//! from Postgres; the cache only buys latency.

pub mod keys;

use std::sync::Arc;

use uuid::Uuid;

use letsmeet_shared::clients::redis::RedisClient;

#[axum::async_trait]
pub trait DiscoveryCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str, ttl_secs: u64);
    async fn invalidate_key(&self, key: &str);
    async fn invalidate_pattern(&self, pattern: &str) -> u64;
}

pub type SharedCache = Arc<dyn DiscoveryCache>;

// --- Redis-backed implementation ---

pub struct RedisCache {
    client: RedisClient,
}

impl RedisCache {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[axum::async_trait]
impl DiscoveryCache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        match self.client.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        if let Err(e) = self.client.set(key, value, ttl_secs).await {
            tracing::warn!(error = %e, key = %key, "cache write failed");
        }
    }

    async fn invalidate_key(&self, key: &str) {
        if let Err(e) = self.client.del(key).await {
            tracing::warn!(error = %e, key = %key, "cache invalidation failed");
        }
    }

    async fn invalidate_pattern(&self, pattern: &str) -> u64 {
        let keys = match self.client.scan_keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, pattern = %pattern, "cache scan failed");
                return 0;
            }
        };
        match self.client.del_keys(&keys).await {
            Ok(count) => {
                tracing::debug!(pattern = %pattern, count, "cache pattern invalidated");
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, pattern = %pattern, "cache invalidation failed");
                0
            }
        }
    }
}

// --- No-op implementation ---

/// Cache that always misses. Used when no Redis is configured and by tests,
/// so correctness never depends on cache contents.
pub struct NoopCache;

#[axum::async_trait]
impl DiscoveryCache for NoopCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) {}

    async fn invalidate_key(&self, _key: &str) {}

    async fn invalidate_pattern(&self, _pattern: &str) -> u64 {
        0
    }
}

// --- Named invalidation operations ---
// Every mutation path calls one of these instead of re-deriving key strings.

/// Drop the user's cached feed pages and feed count after a swipe or a
/// ranking-relevant profile edit.
pub async fn invalidate_feed_for(cache: &dyn DiscoveryCache, user_id: Uuid) {
    cache.invalidate_pattern(&keys::feed_pattern(user_id)).await;
    cache.invalidate_key(&keys::feed_count(user_id)).await;
}

/// Drop both participants' match lists after a match is created, reactivated
/// or ended.
pub async fn invalidate_matches_for(cache: &dyn DiscoveryCache, user1_id: Uuid, user2_id: Uuid) {
    cache.invalidate_key(&keys::matches(user1_id)).await;
    cache.invalidate_key(&keys::matches(user2_id)).await;
}

/// Drop cached message pages for a match after an unmatch.
pub async fn invalidate_messages_for(cache: &dyn DiscoveryCache, match_id: Uuid) {
    cache
        .invalidate_pattern(&keys::messages_pattern(match_id))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_cache_always_misses() {
        let cache = NoopCache;
        cache.set("feed:x:20", "[]", 300).await;
        assert_eq!(cache.get("feed:x:20").await, None);
        assert_eq!(cache.invalidate_pattern("feed:*").await, 0);
    }

    #[tokio::test]
    async fn named_invalidations_accept_any_implementation() {
        let cache = NoopCache;
        let user = Uuid::new_v4();
        // must not panic or error regardless of backend state
        invalidate_feed_for(&cache, user).await;
        invalidate_matches_for(&cache, user, Uuid::new_v4()).await;
        invalidate_messages_for(&cache, Uuid::new_v4()).await;
    }
}
