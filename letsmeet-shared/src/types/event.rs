use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping every domain event on the platform bus.
///
/// Routing key format: `letsmeet.{domain}.{entity}.{action}`,
/// e.g. `letsmeet.discovery.match.created`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // User events (consumed: profile edits invalidate discovery caches)
    pub const USER_PROFILE_UPDATED: &str = "letsmeet.user.profile.updated";

    // Discovery events
    pub const DISCOVERY_SWIPE_RECORDED: &str = "letsmeet.discovery.swipe.recorded";
    pub const DISCOVERY_MATCH_CREATED: &str = "letsmeet.discovery.match.created";
    pub const DISCOVERY_MATCH_ENDED: &str = "letsmeet.discovery.match.ended";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub profile_id: Uuid,
        pub user_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SwipeRecorded {
        pub user_id: Uuid,
        pub target_user_id: Uuid,
        pub action: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user1_id: Uuid,
        pub user2_id: Uuid,
        pub reactivated: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchEnded {
        pub match_id: Uuid,
        pub user1_id: Uuid,
        pub user2_id: Uuid,
        pub ended_by: Uuid,
    }
}
