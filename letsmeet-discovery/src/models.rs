use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use letsmeet_shared::errors::{AppError, ErrorCode};

use crate::schema::{matches, profiles, swipes};

// --- Profile ---

/// A dating profile as stored by the profile service. Read-only here:
/// discovery never writes this table.
#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub age: i32,
    pub gender: String,
    pub looking_for: Vec<String>,
    pub bio: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photos: Vec<String>,
    pub interests: Vec<String>,
    pub relationship_goal: Option<String>,
    pub max_distance: Option<i32>,
    pub age_range_min: Option<i32>,
    pub age_range_max: Option<i32>,
    pub is_active: bool,
    pub last_active: DateTime<Utc>,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- SwipeAction ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    Like,
    Pass,
    SuperLike,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Pass => "pass",
            SwipeAction::SuperLike => "super_like",
        }
    }

    /// Only likes participate in reciprocity and count toward the daily quota.
    pub fn is_like(&self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::SuperLike)
    }
}

impl std::fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SwipeAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeAction::Like),
            "pass" => Ok(SwipeAction::Pass),
            "super_like" => Ok(SwipeAction::SuperLike),
            other => Err(AppError::new(
                ErrorCode::InvalidSwipeAction,
                format!("unknown swipe action: {other}"),
            )),
        }
    }
}

// --- Swipe ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_user_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub user_id: Uuid,
    pub target_user_id: Uuid,
    pub action: String,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub matched_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    pub fn other_user(&self, user_id: Uuid) -> Uuid {
        if self.user1_id == user_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub matched_at: DateTime<Utc>,
}

/// Deterministic ordering for a match pair. A match between A and B is stored
/// as exactly one row, smaller uuid first, whichever direction liked first.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

// --- API-facing shapes ---

/// Feed entry returned to clients: the candidate's public card plus the
/// requester-relative fields (distance, shared interests).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CandidateProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub photos: Vec<String>,
    pub interests: Vec<String>,
    pub relationship_goal: Option<String>,
    pub last_active: DateTime<Utc>,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<i64>,
    pub mutual_interests: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProfileCard {
    pub user_id: Uuid,
    pub display_name: String,
    pub age: i32,
    pub photos: Vec<String>,
    pub bio: Option<String>,
}

impl From<&Profile> for ProfileCard {
    fn from(p: &Profile) -> Self {
        Self {
            user_id: p.user_id,
            display_name: p.display_name.clone(),
            age: p.age,
            photos: p.photos.clone(),
            bio: p.bio.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchWithProfile {
    pub id: Uuid,
    pub matched_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub other_user: ProfileCard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        let (lo, hi) = canonical_pair(a, b);
        assert!(lo < hi);
    }

    #[test]
    fn swipe_action_round_trips_through_strings() {
        for action in [SwipeAction::Like, SwipeAction::Pass, SwipeAction::SuperLike] {
            assert_eq!(action.as_str().parse::<SwipeAction>().unwrap(), action);
        }
        assert!("nope".parse::<SwipeAction>().is_err());
    }

    #[test]
    fn only_likes_form_matches() {
        assert!(SwipeAction::Like.is_like());
        assert!(SwipeAction::SuperLike.is_like());
        assert!(!SwipeAction::Pass.is_like());
    }

    #[test]
    fn match_other_user_returns_the_partner() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (user1_id, user2_id) = canonical_pair(a, b);
        let m = Match {
            id: Uuid::new_v4(),
            user1_id,
            user2_id,
            matched_at: Utc::now(),
            last_message_at: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(m.involves(a));
        assert!(m.involves(b));
        assert!(!m.involves(Uuid::new_v4()));
        assert_eq!(m.other_user(a), b);
        assert_eq!(m.other_user(b), a);
    }
}
