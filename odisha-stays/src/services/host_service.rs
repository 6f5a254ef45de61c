use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{HostPatch, HostProfile, NewHost};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHostRequest {
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 5, max = 20, message = "phone number must be 5-20 characters"))]
    pub phone_number: String,
    pub offerings: Option<String>,
    pub work_description: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

fn host_not_found() -> AppError {
    AppError::new(ErrorCode::HostNotFound, "host profile not found")
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

pub fn become_host(state: &AppState, user_id: Uuid, req: CreateHostRequest) -> AppResult<HostProfile> {
    let req = CreateHostRequest {
        address: req.address.trim().to_string(),
        phone_number: req.phone_number.trim().to_string(),
        ..req
    };
    req.validate()?;

    if state.store.host_for_user(user_id)?.is_some() {
        return Err(AppError::new(ErrorCode::HostAlreadyExists, "user already has a host profile"));
    }

    let host = state.store.create_host(NewHost {
        user_id,
        address: req.address,
        phone_number: req.phone_number,
        offerings: req.offerings,
        work_description: req.work_description,
        interests: clean_tags(req.interests),
        image_url: req.image_url,
    })?;

    tracing::info!(user_id = %user_id, host_id = %host.id, "host profile created");
    Ok(host)
}

pub fn get(state: &AppState, host_id: Uuid) -> AppResult<HostProfile> {
    state.store.get_host(host_id)?.ok_or_else(host_not_found)
}

pub fn mine(state: &AppState, user_id: Uuid) -> AppResult<HostProfile> {
    state.store.host_for_user(user_id)?.ok_or_else(host_not_found)
}

pub fn update(state: &AppState, host_id: Uuid, mut patch: HostPatch) -> AppResult<HostProfile> {
    patch.address = patch.address.map(|a| a.trim().to_string());
    patch.phone_number = patch.phone_number.map(|p| p.trim().to_string());
    patch.interests = patch.interests.map(clean_tags);
    patch.validate()?;

    state.store.update_host(host_id, &patch)?.ok_or_else(host_not_found)
}

/// Delete a host profile and its photo rows; returns the photo URLs so the
/// caller can clean object storage.
pub fn delete(state: &AppState, host_id: Uuid) -> AppResult<Vec<String>> {
    let photo_urls: Vec<String> = state
        .store
        .list_photos(host_id)?
        .into_iter()
        .map(|p| p.photo_url)
        .collect();

    if !state.store.delete_host(host_id)? {
        return Err(host_not_found());
    }

    tracing::info!(host_id = %host_id, photos = photo_urls.len(), "host profile deleted");
    Ok(photo_urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransitionPolicy;

    fn request(address: &str, phone: &str) -> CreateHostRequest {
        CreateHostRequest {
            address: address.into(),
            phone_number: phone.into(),
            offerings: Some("Home-cooked dalma".into()),
            work_description: None,
            interests: vec![" cooking ".into(), "cooking".into(), "".into(), "odissi".into()],
            image_url: None,
        }
    }

    #[test]
    fn address_and_phone_are_required() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let user = Uuid::now_v7();

        let err = become_host(&state, user, request("   ", "+91 98765 43210")).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);

        let err = become_host(&state, user, request("Puri", "")).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
    }

    #[test]
    fn second_host_profile_conflicts() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let user = Uuid::now_v7();

        let host = become_host(&state, user, request("Puri", "+91 98765 43210")).unwrap();
        assert_eq!(host.interests, vec!["cooking", "odissi"]);

        let err = become_host(&state, user, request("Cuttack", "+91 98765 43210")).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::HostAlreadyExists);
    }

    #[test]
    fn missing_host_is_host_not_found() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        assert_eq!(mine(&state, Uuid::now_v7()).unwrap_err().error_code(), ErrorCode::HostNotFound);
        assert_eq!(delete(&state, Uuid::now_v7()).unwrap_err().error_code(), ErrorCode::HostNotFound);
    }
}
