//! Every cache key used by the discovery service is built here, so mutation
//! paths and read paths can never disagree on the format.

use uuid::Uuid;

pub const FEED_TTL_SECS: u64 = 300;
pub const FEED_COUNT_TTL_SECS: u64 = 600;
pub const MATCHES_TTL_SECS: u64 = 300;

/// Feed results are scoped per user and per limit so differently sized
/// requests do not collide.
pub fn feed(user_id: Uuid, limit: i64) -> String {
    format!("feed:{user_id}:{limit}")
}

pub fn feed_pattern(user_id: Uuid) -> String {
    format!("feed:{user_id}:*")
}

pub fn feed_count(user_id: Uuid) -> String {
    format!("feed-count:{user_id}")
}

pub fn matches(user_id: Uuid) -> String {
    format!("matches:{user_id}")
}

pub fn messages_pattern(match_id: Uuid) -> String {
    format!("messages:{match_id}:*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_keys_embed_user_and_limit() {
        let user = Uuid::nil();
        assert_eq!(
            feed(user, 20),
            "feed:00000000-0000-0000-0000-000000000000:20"
        );
        assert_ne!(feed(user, 20), feed(user, 50));
    }

    #[test]
    fn feed_pattern_covers_every_limit() {
        let user = Uuid::new_v4();
        let pattern = feed_pattern(user);
        let key = feed(user, 33);
        assert!(key.starts_with(pattern.trim_end_matches('*')));
    }
}
