use metrics::counter;
use uuid::Uuid;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::{Paginated, PaginationParams};

use crate::domain::{Decision, StayStatus, TransitionPolicy};
use crate::events::RelayEvent;
use crate::models::{
    AdminStayRequest, IncomingRequest, NewStayRequest, NewSurferReview, OutgoingRequest,
    StayRequest, SurferReview,
};
use crate::store::StatusChange;
use crate::AppState;

fn request_not_found(id: Uuid) -> AppError {
    AppError::new(ErrorCode::StayRequestNotFound, format!("stay request {id} not found"))
}

fn already_decided(request: &StayRequest) -> AppError {
    AppError::with_details(
        ErrorCode::StayAlreadyDecided,
        format!("stay request is already {}", request.status),
        serde_json::json!({ "current": request.status.as_str() }),
    )
}

fn normalize_message(message: Option<String>) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// A surfer asks to stay with a host. The host owner is alerted on the relay.
pub fn create(
    state: &AppState,
    surfer_id: Uuid,
    host_id: Uuid,
    message: Option<String>,
) -> AppResult<StayRequest> {
    let host = state
        .store
        .get_host(host_id)?
        .ok_or_else(|| AppError::new(ErrorCode::HostNotFound, "host profile not found"))?;

    if host.user_id == surfer_id {
        return Err(AppError::new(
            ErrorCode::CannotRequestOwnStay,
            "cannot request a stay with your own host profile",
        ));
    }

    let request = state.store.create_stay_request(NewStayRequest::pending(
        host_id,
        surfer_id,
        normalize_message(message),
    ))?;

    counter!("stay_requests_created_total").increment(1);
    tracing::info!(
        stay_request_id = %request.id,
        host_id = %host_id,
        surfer_id = %surfer_id,
        "stay request created"
    );

    // a failed name lookup still notifies the host
    let surfer_name = match state.store.get_profile(surfer_id) {
        Ok(profile) => profile.and_then(|p| p.full_name),
        Err(e) => {
            tracing::warn!(error = %e, surfer_id = %surfer_id, "surfer name lookup failed");
            None
        }
    };
    state
        .events
        .emit(RelayEvent::stay_request_created(host.user_id, &request, surfer_name));

    Ok(request)
}

/// Host inbox. A user without a host profile simply has no requests.
pub fn incoming(state: &AppState, user_id: Uuid) -> AppResult<Vec<IncomingRequest>> {
    match state.store.host_for_user(user_id)? {
        Some(host) => state.store.incoming_for_host(host.id),
        None => Ok(Vec::new()),
    }
}

/// Surfer tracker.
pub fn outgoing(state: &AppState, user_id: Uuid) -> AppResult<Vec<OutgoingRequest>> {
    state.store.outgoing_for_surfer(user_id)
}

/// Approve or reject. Only the host owner of the request, or an admin, may decide.
pub fn decide(
    state: &AppState,
    caller: &AuthUser,
    request_id: Uuid,
    decision: Decision,
) -> AppResult<StayRequest> {
    let request = state
        .store
        .get_stay_request(request_id)?
        .ok_or_else(|| request_not_found(request_id))?;

    let is_host_owner = state
        .store
        .get_host(request.host_id)?
        .is_some_and(|h| h.user_id == caller.id);
    if !is_host_owner && !caller.is_admin() {
        return Err(AppError::new(
            ErrorCode::NotStayParticipant,
            "only the host of this request can decide on it",
        ));
    }

    let next = request.status.transition(decision, state.policy)?;
    let expected = match state.policy {
        TransitionPolicy::Strict => Some(request.status),
        TransitionPolicy::Permissive => None,
    };
    let updated = match state.store.set_stay_status(request_id, expected, next)? {
        StatusChange::Updated(updated) => updated,
        StatusChange::Conflict(current) => {
            tracing::info!(
                stay_request_id = %request_id,
                status = %current.status,
                "stay request decided concurrently"
            );
            return Err(already_decided(&current));
        }
        StatusChange::NotFound => return Err(request_not_found(request_id)),
    };

    counter!("stay_requests_decided_total", "status" => next.as_str()).increment(1);
    tracing::info!(
        stay_request_id = %request_id,
        decided_by = %caller.id,
        from = %request.status,
        to = %next,
        "stay request decided"
    );

    state.events.emit(RelayEvent::stay_request_decided(&updated));

    Ok(updated)
}

pub fn admin_list(
    state: &AppState,
    status: Option<StayStatus>,
    params: &PaginationParams,
) -> AppResult<Paginated<AdminStayRequest>> {
    let (items, total) = state
        .store
        .list_stay_requests(status, params.offset(), params.limit())?;
    Ok(Paginated::new(items, total, params))
}

pub fn admin_delete(state: &AppState, admin_id: Uuid, request_id: Uuid) -> AppResult<()> {
    if !state.store.delete_stay_request(request_id)? {
        return Err(request_not_found(request_id));
    }
    tracing::info!(stay_request_id = %request_id, admin_id = %admin_id, "stay request deleted");
    Ok(())
}

/// A host reviews the surfer of one of their approved requests.
pub fn review_surfer(
    state: &AppState,
    host_user_id: Uuid,
    request_id: Uuid,
    rating: i32,
    review_text: &str,
) -> AppResult<SurferReview> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::new(ErrorCode::InvalidRating, "rating must be between 1 and 5"));
    }
    let review_text = review_text.trim();
    if review_text.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "review text is required"));
    }

    let request = state
        .store
        .get_stay_request(request_id)?
        .ok_or_else(|| request_not_found(request_id))?;
    let host = state.store.get_host(request.host_id)?;

    let allowed = request.status == StayStatus::Approved
        && host.as_ref().is_some_and(|h| h.user_id == host_user_id);
    if !allowed {
        return Err(AppError::new(
            ErrorCode::ReviewNotAllowed,
            "only the host of an approved stay can review the surfer",
        ));
    }

    let review = state.store.create_surfer_review(NewSurferReview {
        host_id: request.host_id,
        surfer_id: request.surfer_id,
        stay_request_id: Some(request.id),
        rating,
        review_text: review_text.to_string(),
    })?;

    tracing::info!(review_id = %review.id, surfer_id = %request.surfer_id, "surfer reviewed");
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewHost;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use odisha_shared::types::auth::UserRole;

    fn user(id: Uuid, role: UserRole) -> AuthUser {
        AuthUser { id, role, token_id: Uuid::now_v7() }
    }

    fn seed_host(state: &AppState) -> (Uuid, Uuid) {
        let owner = Uuid::now_v7();
        let host = state
            .store
            .create_host(NewHost {
                user_id: owner,
                address: "Konark".into(),
                phone_number: "+91 90000 11111".into(),
                offerings: None,
                work_description: None,
                interests: vec![],
                image_url: None,
            })
            .unwrap();
        (owner, host.id)
    }

    #[test]
    fn message_is_trimmed_and_blank_dropped() {
        assert_eq!(normalize_message(Some("  hi  ".into())).as_deref(), Some("hi"));
        assert_eq!(normalize_message(Some("   ".into())), None);
        assert_eq!(normalize_message(None), None);
    }

    #[test]
    fn cannot_request_own_host_profile() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let (owner, host_id) = seed_host(&state);
        let err = create(&state, owner, host_id, None).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::CannotRequestOwnStay);

        let err = create(&state, owner, Uuid::now_v7(), None).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::HostNotFound);
    }

    #[test]
    fn only_host_owner_or_admin_decides() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let (owner, host_id) = seed_host(&state);
        let surfer = Uuid::now_v7();
        let req = create(&state, surfer, host_id, Some("Two nights".into())).unwrap();
        assert_eq!(req.status, StayStatus::Pending);

        let err = decide(&state, &user(surfer, UserRole::User), req.id, Decision::Approve).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotStayParticipant);

        let decided = decide(&state, &user(owner, UserRole::User), req.id, Decision::Approve).unwrap();
        assert_eq!(decided.status, StayStatus::Approved);

        let err = decide(&state, &user(Uuid::now_v7(), UserRole::Admin), req.id, Decision::Reject).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::StayAlreadyDecided);
    }

    #[test]
    fn admin_can_decide_under_permissive_policy() {
        let state = AppState::in_memory(TransitionPolicy::Permissive);
        let (owner, host_id) = seed_host(&state);
        let req = create(&state, Uuid::now_v7(), host_id, None).unwrap();

        decide(&state, &user(owner, UserRole::User), req.id, Decision::Approve).unwrap();
        let final_state = decide(&state, &user(Uuid::now_v7(), UserRole::Admin), req.id, Decision::Reject).unwrap();
        assert_eq!(final_state.status, StayStatus::Rejected);
    }

    #[test]
    fn concurrent_decisions_under_strict_policy_have_one_winner() {
        let state = Arc::new(AppState::in_memory(TransitionPolicy::Strict));
        let (owner, host_id) = seed_host(&state);
        let host = user(owner, UserRole::User);

        for _ in 0..200 {
            let surfer = Uuid::now_v7();
            let mut alerts = state.events.subscribe_for(surfer);
            let req = create(&state, surfer, host_id, None).unwrap();
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = [Decision::Approve, Decision::Reject]
                .into_iter()
                .map(|decision| {
                    let (state, barrier, host) = (state.clone(), barrier.clone(), host.clone());
                    thread::spawn(move || {
                        barrier.wait();
                        decide(&state, &host, req.id, decision)
                    })
                })
                .collect();
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

            let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(winners.len(), 1);
            let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
            assert_eq!(loser.error_code(), ErrorCode::StayAlreadyDecided);

            let stored = state.store.get_stay_request(req.id).unwrap().unwrap();
            assert_eq!(stored.status, winners[0].status);

            assert!(alerts.try_recv().is_some());
            assert!(alerts.try_recv().is_none());
        }
    }

    #[test]
    fn stale_read_is_rejected_by_the_store() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let (_, host_id) = seed_host(&state);
        let req = create(&state, Uuid::now_v7(), host_id, None).unwrap();

        let first = state
            .store
            .set_stay_status(req.id, Some(StayStatus::Pending), StayStatus::Approved)
            .unwrap();
        assert!(matches!(first, StatusChange::Updated(r) if r.status == StayStatus::Approved));

        let second = state
            .store
            .set_stay_status(req.id, Some(StayStatus::Pending), StayStatus::Rejected)
            .unwrap();
        assert!(matches!(second, StatusChange::Conflict(r) if r.status == StayStatus::Approved));

        let missing = state
            .store
            .set_stay_status(Uuid::now_v7(), None, StayStatus::Rejected)
            .unwrap();
        assert!(matches!(missing, StatusChange::NotFound));
    }

    #[test]
    fn admin_list_past_the_last_page_is_empty() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let (_, host_id) = seed_host(&state);
        create(&state, Uuid::now_v7(), host_id, None).unwrap();

        let params: PaginationParams =
            serde_json::from_str(r#"{"page":18446744073709551615,"per_page":20}"#).unwrap();
        let page = admin_list(&state, None, &params).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn reviews_need_an_approved_stay() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let (owner, host_id) = seed_host(&state);
        let surfer = Uuid::now_v7();
        let req = create(&state, surfer, host_id, None).unwrap();

        let err = review_surfer(&state, owner, req.id, 5, "Lovely guest").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ReviewNotAllowed);

        decide(&state, &user(owner, UserRole::User), req.id, Decision::Approve).unwrap();

        let err = review_surfer(&state, surfer, req.id, 5, "Self praise").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ReviewNotAllowed);
        let err = review_surfer(&state, owner, req.id, 9, "Too high").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidRating);

        let review = review_surfer(&state, owner, req.id, 5, " Lovely guest ").unwrap();
        assert_eq!(review.surfer_id, surfer);
        assert_eq!(review.review_text, "Lovely guest");
    }
}
