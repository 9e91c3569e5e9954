//! Daily swipe quota, derived from the swipe ledger.
//!
//! There is no counter row to increment or reset: the quota is a count of
//! today's like rows, so the day boundary is just a timestamp filter and
//! nothing can drift.

use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::swipes;

pub const FREE_DAILY_SWIPE_LIMIT: i64 = 50;

/// Actions that consume quota. Passes are free.
const COUNTED_ACTIONS: [&str; 2] = ["like", "super_like"];

/// Start of the current UTC calendar day.
pub fn day_start_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn within_daily_limit(count: i64) -> bool {
    count < FREE_DAILY_SWIPE_LIMIT
}

/// The limit to report for a tier: free users get the cap, premium none.
pub fn limit_for(is_premium: bool) -> Option<i64> {
    (!is_premium).then_some(FREE_DAILY_SWIPE_LIMIT)
}

/// Likes and super-likes recorded by this user since UTC midnight.
pub fn today_like_count(
    conn: &mut PgConnection,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> QueryResult<i64> {
    swipes::table
        .filter(swipes::user_id.eq(user_id))
        .filter(swipes::action.eq_any(COUNTED_ACTIONS))
        .filter(swipes::created_at.ge(day_start_utc(now)))
        .count()
        .get_result(conn)
}

#[derive(Debug, Serialize)]
pub struct SwipeStats {
    pub count: i64,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_starts_at_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 23, 59, 59).unwrap();
        let start = day_start_utc(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap());

        // one second later is a fresh day
        let next = now + chrono::Duration::seconds(1);
        assert_eq!(
            day_start_utc(next),
            Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn limit_boundary_is_exclusive() {
        assert!(within_daily_limit(0));
        assert!(within_daily_limit(FREE_DAILY_SWIPE_LIMIT - 1));
        assert!(!within_daily_limit(FREE_DAILY_SWIPE_LIMIT));
        assert!(!within_daily_limit(FREE_DAILY_SWIPE_LIMIT + 50));
    }

    #[test]
    fn premium_users_report_no_limit() {
        assert_eq!(limit_for(true), None);
        assert_eq!(limit_for(false), Some(FREE_DAILY_SWIPE_LIMIT));
    }
}
