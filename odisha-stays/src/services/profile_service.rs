use serde::Serialize;
use uuid::Uuid;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};

use crate::domain::StayStatus;
use crate::models::{OutgoingRequest, Profile, ProfilePatch, SurferReview};
use crate::AppState;

const STAY_HISTORY_LIMIT: usize = 10;

/// What a host sees when looking at a surfer.
#[derive(Debug, Serialize)]
pub struct SurferCard {
    pub profile: Profile,
    pub reviews: Vec<SurferReview>,
    pub average_rating: Option<f64>,
    pub review_count: usize,
    pub stay_history: Vec<OutgoingRequest>,
}

/// Default profile for a freshly registered user. Redelivered events are no-ops.
pub fn create_default_profile(
    state: &AppState,
    user_id: Uuid,
    full_name: Option<String>,
) -> AppResult<Profile> {
    state.store.ensure_profile(user_id, full_name)
}

pub fn get(state: &AppState, user_id: Uuid) -> AppResult<Profile> {
    state
        .store
        .get_profile(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

pub fn card(state: &AppState, user_id: Uuid) -> AppResult<SurferCard> {
    let profile = get(state, user_id)?;
    let reviews = state.store.reviews_for_surfer(user_id)?;
    let stay_history: Vec<OutgoingRequest> = state
        .store
        .outgoing_for_surfer(user_id)?
        .into_iter()
        .filter(|r| r.request.status == StayStatus::Approved)
        .take(STAY_HISTORY_LIMIT)
        .collect();

    Ok(SurferCard {
        average_rating: average_rating(&reviews),
        review_count: reviews.len(),
        profile,
        reviews,
        stay_history,
    })
}

/// Mean rating rounded to one decimal, `None` without reviews.
pub fn average_rating(reviews: &[SurferReview]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let mean = sum as f64 / reviews.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

pub fn normalize_patch(mut patch: ProfilePatch) -> ProfilePatch {
    patch.full_name = patch.full_name.map(|n| n.trim().to_string());
    patch.hometown = patch.hometown.map(|h| h.trim().to_string());
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn review(rating: i32) -> SurferReview {
        SurferReview {
            id: Uuid::now_v7(),
            host_id: Uuid::now_v7(),
            surfer_id: Uuid::now_v7(),
            stay_request_id: None,
            rating,
            review_text: "Great guest".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[review(5)]), Some(5.0));
        assert_eq!(average_rating(&[review(5), review(4), review(4)]), Some(4.3));
        assert_eq!(average_rating(&[review(1), review(2)]), Some(1.5));
    }

    #[test]
    fn names_are_trimmed() {
        let patch = normalize_patch(ProfilePatch {
            full_name: Some("  Priya Das ".into()),
            ..Default::default()
        });
        assert_eq!(patch.full_name.as_deref(), Some("Priya Das"));
    }
}
