use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::models::{CandidateProfile, Profile};

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
pub const DEFAULT_AGE_MIN: i32 = 18;
pub const DEFAULT_AGE_MAX: i32 = 99;

/// Free accounts idle longer than this are suppressed from discovery.
pub const INACTIVITY_WINDOW_DAYS: i64 = 30;

/// Haversine distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

/// Distance between two profiles, or None when either side has no location.
pub fn distance_km(requester: &Profile, candidate: &Profile) -> Option<f64> {
    match (
        requester.latitude,
        requester.longitude,
        candidate.latitude,
        candidate.longitude,
    ) {
        (Some(lat1), Some(lng1), Some(lat2), Some(lng2)) => {
            Some(haversine_km(lat1, lng1, lat2, lng2))
        }
        _ => None,
    }
}

fn age_range(p: &Profile) -> (i32, i32) {
    (
        p.age_range_min.unwrap_or(DEFAULT_AGE_MIN),
        p.age_range_max.unwrap_or(DEFAULT_AGE_MAX),
    )
}

/// Profile completeness: +10 for a bio, up to 20 for photos (capped at 3),
/// +10 for three or more interests.
pub fn completeness_score(p: &Profile) -> i32 {
    let mut score = 0;
    if p.bio.as_deref().is_some_and(|b| !b.is_empty()) {
        score += 10;
    }
    let photo_count = p.photos.len() as i32;
    score += if photo_count >= 3 { 20 } else { photo_count * 5 };
    if p.interests.len() >= 3 {
        score += 10;
    }
    score
}

/// Interests the candidate shares with the requester, in candidate order.
pub fn mutual_interests(requester: &Profile, candidate: &Profile) -> Vec<String> {
    candidate
        .interests
        .iter()
        .filter(|i| requester.interests.contains(i))
        .cloned()
        .collect()
}

/// Full eligibility filter for one candidate relative to the requester.
///
/// The distance cap always applies: a pair where either side has no
/// coordinates is at effectively infinite distance and never eligible.
pub fn is_eligible(
    requester: &Profile,
    candidate: &Profile,
    swiped: &HashSet<Uuid>,
    now: DateTime<Utc>,
) -> bool {
    if candidate.user_id == requester.user_id || !candidate.is_active {
        return false;
    }
    // once swiped, never reshown, regardless of action
    if swiped.contains(&candidate.user_id) {
        return false;
    }
    if !requester.looking_for.contains(&candidate.gender)
        || !candidate.looking_for.contains(&requester.gender)
    {
        return false;
    }
    let (r_min, r_max) = age_range(requester);
    if candidate.age < r_min || candidate.age > r_max {
        return false;
    }
    let (c_min, c_max) = age_range(candidate);
    if requester.age < c_min || requester.age > c_max {
        return false;
    }
    if !candidate.is_premium
        && candidate.last_active < now - Duration::days(INACTIVITY_WINDOW_DAYS)
    {
        return false;
    }
    let cap = requester
        .max_distance
        .map(f64::from)
        .unwrap_or(DEFAULT_MAX_DISTANCE_KM);
    match distance_km(requester, candidate) {
        Some(d) => d <= cap,
        None => false,
    }
}

/// A candidate that passed eligibility, carrying its ranking keys.
#[derive(Debug)]
pub struct RankedCandidate {
    pub profile: Profile,
    pub distance_km: Option<f64>,
    pub mutual_interests: Vec<String>,
    hours_inactive: f64,
    completeness: i32,
    jitter: f64,
}

impl RankedCandidate {
    pub fn into_candidate_profile(self) -> CandidateProfile {
        CandidateProfile {
            id: self.profile.id,
            user_id: self.profile.user_id,
            display_name: self.profile.display_name,
            age: self.profile.age,
            gender: self.profile.gender,
            bio: self.profile.bio,
            photos: self.profile.photos,
            interests: self.profile.interests,
            relationship_goal: self.profile.relationship_goal,
            last_active: self.profile.last_active,
            is_premium: self.profile.is_premium,
            distance: self.distance_km.map(|d| d.round() as i64),
            mutual_interests: self.mutual_interests,
        }
    }
}

/// Filter and order candidates for the requester's feed.
///
/// Tie-break order: recently active first, then completeness, proximity,
/// shared interests, and a per-query random jitter. Feed order is not stable
/// across calls.
pub fn rank_candidates<R: Rng>(
    requester: &Profile,
    candidates: Vec<Profile>,
    swiped: &HashSet<Uuid>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter(|c| is_eligible(requester, c, swiped, now))
        .map(|c| RankedCandidate {
            distance_km: distance_km(requester, &c),
            mutual_interests: mutual_interests(requester, &c),
            hours_inactive: (now - c.last_active).num_seconds() as f64 / 3600.0,
            completeness: completeness_score(&c),
            jitter: rng.gen(),
            profile: c,
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.hours_inactive
            .total_cmp(&b.hours_inactive)
            .then_with(|| b.completeness.cmp(&a.completeness))
            .then_with(|| {
                a.distance_km
                    .unwrap_or(f64::INFINITY)
                    .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
            })
            .then_with(|| b.mutual_interests.len().cmp(&a.mutual_interests.len()))
            .then_with(|| a.jitter.total_cmp(&b.jitter))
    });

    ranked
}

/// How many candidates would appear in the requester's feed, unbounded.
pub fn eligible_count(
    requester: &Profile,
    candidates: &[Profile],
    swiped: &HashSet<Uuid>,
    now: DateTime<Utc>,
) -> i64 {
    candidates
        .iter()
        .filter(|c| is_eligible(requester, c, swiped, now))
        .count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn profile(gender: &str, looking_for: &[&str], age: i32) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: "test".into(),
            age,
            gender: gender.into(),
            looking_for: looking_for.iter().map(|s| s.to_string()).collect(),
            bio: None,
            latitude: Some(37.77),
            longitude: Some(-122.41),
            photos: vec![],
            interests: vec![],
            relationship_goal: None,
            max_distance: None,
            age_range_min: None,
            age_range_max: None,
            is_active: true,
            last_active: now,
            is_premium: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn requester() -> Profile {
        profile("male", &["female"], 28)
    }

    fn candidate() -> Profile {
        let mut c = profile("female", &["male"], 26);
        c.latitude = Some(37.80);
        c.longitude = Some(-122.27);
        c
    }

    #[test]
    fn haversine_of_identical_points_is_zero() {
        assert!(haversine_km(37.77, -122.41, 37.77, -122.41).abs() < 1e-9);
    }

    #[test]
    fn haversine_across_the_bay_is_about_thirteen_km() {
        let d = haversine_km(37.77, -122.41, 37.80, -122.27);
        assert!(d > 12.0 && d < 14.0, "got {d}");
    }

    #[test]
    fn completeness_rewards_bio_photos_and_interests() {
        let mut p = candidate();
        assert_eq!(completeness_score(&p), 0);

        p.bio = Some("hello".into());
        assert_eq!(completeness_score(&p), 10);

        p.photos = vec!["a.jpg".into()];
        assert_eq!(completeness_score(&p), 15);

        p.photos = vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into(), "d.jpg".into()];
        assert_eq!(completeness_score(&p), 30);

        p.interests = vec!["hiking".into(), "jazz".into(), "cooking".into()];
        assert_eq!(completeness_score(&p), 40);
    }

    #[test]
    fn empty_bio_does_not_count_as_complete() {
        let mut p = candidate();
        p.bio = Some(String::new());
        assert_eq!(completeness_score(&p), 0);
    }

    #[test]
    fn basic_pair_is_eligible() {
        let now = Utc::now();
        assert!(is_eligible(&requester(), &candidate(), &HashSet::new(), now));
    }

    #[test]
    fn self_and_inactive_profiles_are_excluded() {
        let now = Utc::now();
        let r = requester();

        let mut same = candidate();
        same.user_id = r.user_id;
        assert!(!is_eligible(&r, &same, &HashSet::new(), now));

        let mut deactivated = candidate();
        deactivated.is_active = false;
        assert!(!is_eligible(&r, &deactivated, &HashSet::new(), now));
    }

    #[test]
    fn already_swiped_candidates_never_reappear() {
        let now = Utc::now();
        let r = requester();
        let c = candidate();
        let swiped: HashSet<Uuid> = [c.user_id].into_iter().collect();
        assert!(!is_eligible(&r, &c, &swiped, now));
    }

    #[test]
    fn gender_preference_must_be_mutual() {
        let now = Utc::now();
        let r = requester();

        let mut not_interested = candidate();
        not_interested.looking_for = vec!["female".into()];
        assert!(!is_eligible(&r, &not_interested, &HashSet::new(), now));

        let mut wrong_gender = candidate();
        wrong_gender.gender = "male".into();
        wrong_gender.looking_for = vec!["male".into()];
        assert!(!is_eligible(&r, &wrong_gender, &HashSet::new(), now));
    }

    #[test]
    fn age_range_must_be_mutual_with_defaults() {
        let now = Utc::now();
        let mut r = requester();

        // candidate outside the requester's range
        r.age_range_min = Some(27);
        let c = candidate(); // 26
        assert!(!is_eligible(&r, &c, &HashSet::new(), now));

        // requester outside the candidate's range
        let r = requester();
        let mut picky = candidate();
        picky.age_range_max = Some(25); // requester is 28
        assert!(!is_eligible(&r, &picky, &HashSet::new(), now));

        // unset ranges default to 18-99
        let r = requester();
        let mut older = candidate();
        older.age = 73;
        assert!(is_eligible(&r, &older, &HashSet::new(), now));
    }

    #[test]
    fn stale_free_accounts_are_suppressed_but_premium_survive() {
        let now = Utc::now();
        let r = requester();

        let mut stale = candidate();
        stale.last_active = now - Duration::days(31);
        assert!(!is_eligible(&r, &stale, &HashSet::new(), now));

        stale.is_premium = true;
        assert!(is_eligible(&r, &stale, &HashSet::new(), now));
    }

    #[test]
    fn distance_cap_applies_and_missing_coordinates_exclude() {
        let now = Utc::now();
        let mut r = requester();
        r.max_distance = Some(10); // candidate is ~13 km away
        let c = candidate();
        assert!(!is_eligible(&r, &c, &HashSet::new(), now));

        let r = requester(); // default 50 km
        assert!(is_eligible(&r, &c, &HashSet::new(), now));

        let mut nowhere = candidate();
        nowhere.latitude = None;
        nowhere.longitude = None;
        assert!(!is_eligible(&r, &nowhere, &HashSet::new(), now));

        let mut lost_requester = requester();
        lost_requester.latitude = None;
        lost_requester.longitude = None;
        assert!(!is_eligible(&lost_requester, &c, &HashSet::new(), now));
    }

    #[test]
    fn recently_active_candidates_rank_first() {
        let now = Utc::now();
        let r = requester();
        let mut rng = StdRng::seed_from_u64(42);

        // C: active an hour ago, complete profile
        let mut c = candidate();
        c.last_active = now - Duration::hours(1);
        c.bio = Some("coffee and trail runs".into());
        c.photos = vec!["1.jpg".into(), "2.jpg".into(), "3.jpg".into()];
        c.interests = vec!["hiking".into(), "jazz".into(), "cooking".into(), "film".into()];
        let c_id = c.user_id;

        // D: identical but idle for ten days
        let mut d = c.clone();
        d.id = Uuid::new_v4();
        d.user_id = Uuid::new_v4();
        d.last_active = now - Duration::days(10);

        let ranked = rank_candidates(&r, vec![d, c], &HashSet::new(), now, &mut rng);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].profile.user_id, c_id);
        assert_eq!(ranked[0].distance_km.map(|d| d.round() as i64), Some(13));
    }

    #[test]
    fn completeness_breaks_activity_ties() {
        let now = Utc::now();
        let mut r = requester();
        r.interests = vec!["hiking".into(), "jazz".into()];
        let mut rng = StdRng::seed_from_u64(7);
        let active_at = now - Duration::hours(2);

        let mut sparse = candidate();
        sparse.last_active = active_at;

        let mut complete = candidate();
        complete.id = Uuid::new_v4();
        complete.user_id = Uuid::new_v4();
        complete.last_active = active_at;
        complete.bio = Some("bio".into());
        complete.photos = vec!["1.jpg".into(), "2.jpg".into(), "3.jpg".into()];
        complete.interests = vec!["hiking".into(), "jazz".into(), "cooking".into()];
        let complete_id = complete.user_id;

        let ranked = rank_candidates(&r, vec![sparse, complete], &HashSet::new(), now, &mut rng);
        assert_eq!(ranked[0].profile.user_id, complete_id);
        assert_eq!(ranked[0].mutual_interests, vec!["hiking".to_string(), "jazz".to_string()]);
    }

    #[test]
    fn feed_count_matches_eligible_candidates() {
        let now = Utc::now();
        let r = requester();
        let c = candidate();
        let mut ineligible = candidate();
        ineligible.is_active = false;

        let count = eligible_count(&r, &[c, ineligible], &HashSet::new(), now);
        assert_eq!(count, 1);
    }

    #[test]
    fn ranked_candidate_rounds_distance_for_display() {
        let now = Utc::now();
        let r = requester();
        let mut rng = StdRng::seed_from_u64(1);
        let ranked = rank_candidates(&r, vec![candidate()], &HashSet::new(), now, &mut rng);
        let entry = ranked.into_iter().next().expect("one candidate");
        let card = entry.into_candidate_profile();
        assert_eq!(card.distance, Some(13));
        assert!(card.mutual_interests.is_empty());
    }
}
