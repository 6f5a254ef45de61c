use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use odisha_shared::errors::AppError;

use super::{StatusChange, StayStore, StoreResult};
use crate::domain::StayStatus;
use crate::models::{
    AdminStayRequest, HostListing, HostPatch, HostPhoto, HostProfile, HostSummary,
    IncomingRequest, Message, NewHost, NewHostPhoto, NewMessage, NewStayRequest,
    NewSurferReview, OutgoingRequest, Profile, ProfilePatch, StayRequest, SurferReview,
    SurferSummary,
};

/// Vectors keep insertion order, so "newest first" is a reverse walk.
#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    hosts: Vec<HostProfile>,
    photos: Vec<HostPhoto>,
    requests: Vec<StayRequest>,
    messages: Vec<Message>,
    reviews: Vec<SurferReview>,
}

impl Tables {
    fn owner_name(&self, host: &HostProfile) -> Option<String> {
        self.profiles.get(&host.user_id).and_then(|p| p.full_name.clone())
    }

    fn host(&self, id: Uuid) -> Option<&HostProfile> {
        self.hosts.iter().find(|h| h.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStayStore {
    tables: RwLock<Tables>,
}

impl MemoryStayStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

impl StayStore for MemoryStayStore {
    fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }

    fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(self.read()?.profiles.get(&id).cloned())
    }

    fn ensure_profile(&self, id: Uuid, full_name: Option<String>) -> StoreResult<Profile> {
        let mut t = self.write()?;
        Ok(t.profiles
            .entry(id)
            .or_insert_with(|| Profile::empty(id, full_name))
            .clone())
    }

    fn upsert_profile(&self, id: Uuid, patch: &ProfilePatch) -> StoreResult<Profile> {
        let mut t = self.write()?;
        let profile = t.profiles.entry(id).or_insert_with(|| Profile::empty(id, None));
        profile.apply(patch);
        Ok(profile.clone())
    }

    fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> StoreResult<Option<Profile>> {
        let mut t = self.write()?;
        Ok(t.profiles.get_mut(&id).map(|p| {
            p.apply(patch);
            p.clone()
        }))
    }

    fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let mut all: Vec<Profile> = self.read()?.profiles.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn create_host(&self, host: NewHost) -> StoreResult<HostProfile> {
        let mut t = self.write()?;
        if t.hosts.iter().any(|h| h.user_id == host.user_id) {
            return Err(AppError::new(
                odisha_shared::ErrorCode::HostAlreadyExists,
                "user already has a host profile",
            ));
        }
        let now = Utc::now();
        let created = HostProfile {
            id: Uuid::now_v7(),
            user_id: host.user_id,
            address: host.address,
            phone_number: host.phone_number,
            offerings: host.offerings,
            work_description: host.work_description,
            interests: host.interests,
            image_url: host.image_url,
            created_at: now,
            updated_at: now,
        };
        t.hosts.push(created.clone());
        Ok(created)
    }

    fn get_host(&self, id: Uuid) -> StoreResult<Option<HostProfile>> {
        Ok(self.read()?.host(id).cloned())
    }

    fn host_for_user(&self, user_id: Uuid) -> StoreResult<Option<HostProfile>> {
        Ok(self.read()?.hosts.iter().find(|h| h.user_id == user_id).cloned())
    }

    fn list_hosts(&self) -> StoreResult<Vec<HostListing>> {
        let t = self.read()?;
        Ok(t.hosts
            .iter()
            .rev()
            .map(|h| HostListing {
                owner_name: t.owner_name(h),
                host: h.clone(),
            })
            .collect())
    }

    fn update_host(&self, id: Uuid, patch: &HostPatch) -> StoreResult<Option<HostProfile>> {
        let mut t = self.write()?;
        Ok(t.hosts.iter_mut().find(|h| h.id == id).map(|h| {
            h.apply(patch);
            h.clone()
        }))
    }

    fn delete_host(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.write()?;
        let before = t.hosts.len();
        t.hosts.retain(|h| h.id != id);
        if t.hosts.len() == before {
            return Ok(false);
        }
        t.photos.retain(|p| p.host_id != id);
        Ok(true)
    }

    fn add_photo(&self, photo: NewHostPhoto) -> StoreResult<HostPhoto> {
        let mut t = self.write()?;
        let created = HostPhoto {
            id: Uuid::now_v7(),
            host_id: photo.host_id,
            photo_url: photo.photo_url,
            caption: photo.caption,
            created_at: Utc::now(),
        };
        t.photos.push(created.clone());
        Ok(created)
    }

    fn get_photo(&self, id: Uuid) -> StoreResult<Option<HostPhoto>> {
        Ok(self.read()?.photos.iter().find(|p| p.id == id).cloned())
    }

    fn list_photos(&self, host_id: Uuid) -> StoreResult<Vec<HostPhoto>> {
        Ok(self
            .read()?
            .photos
            .iter()
            .rev()
            .filter(|p| p.host_id == host_id)
            .cloned()
            .collect())
    }

    fn delete_photo(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.write()?;
        let before = t.photos.len();
        t.photos.retain(|p| p.id != id);
        Ok(t.photos.len() != before)
    }

    fn create_stay_request(&self, request: NewStayRequest) -> StoreResult<StayRequest> {
        let mut t = self.write()?;
        let created = StayRequest {
            id: Uuid::now_v7(),
            host_id: request.host_id,
            surfer_id: request.surfer_id,
            message: request.message,
            status: StayStatus::from_column(request.status.as_deref())?,
            created_at: Utc::now(),
        };
        t.requests.push(created.clone());
        Ok(created)
    }

    fn get_stay_request(&self, id: Uuid) -> StoreResult<Option<StayRequest>> {
        Ok(self.read()?.requests.iter().find(|r| r.id == id).cloned())
    }

    fn set_stay_status(
        &self,
        id: Uuid,
        expected: Option<StayStatus>,
        status: StayStatus,
    ) -> StoreResult<StatusChange> {
        let mut t = self.write()?;
        let Some(request) = t.requests.iter_mut().find(|r| r.id == id) else {
            return Ok(StatusChange::NotFound);
        };
        if expected.is_some_and(|e| e != request.status) {
            return Ok(StatusChange::Conflict(request.clone()));
        }
        request.status = status;
        Ok(StatusChange::Updated(request.clone()))
    }

    fn incoming_for_host(&self, host_id: Uuid) -> StoreResult<Vec<IncomingRequest>> {
        let t = self.read()?;
        Ok(t.requests
            .iter()
            .rev()
            .filter(|r| r.host_id == host_id)
            .map(|r| IncomingRequest {
                surfer: t
                    .profiles
                    .get(&r.surfer_id)
                    .map(SurferSummary::from)
                    .unwrap_or_default(),
                request: r.clone(),
            })
            .collect())
    }

    fn outgoing_for_surfer(&self, surfer_id: Uuid) -> StoreResult<Vec<OutgoingRequest>> {
        let t = self.read()?;
        Ok(t.requests
            .iter()
            .rev()
            .filter(|r| r.surfer_id == surfer_id)
            .map(|r| OutgoingRequest {
                host: t.host(r.host_id).map(|h| HostSummary {
                    address: h.address.clone(),
                    owner_name: t.owner_name(h),
                }),
                request: r.clone(),
            })
            .collect())
    }

    fn list_stay_requests(
        &self,
        status: Option<StayStatus>,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<AdminStayRequest>, u64)> {
        let t = self.read()?;
        let matching: Vec<&StayRequest> = t
            .requests
            .iter()
            .rev()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        let total = matching.len() as u64;

        let page = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(|r| {
                let host = t.host(r.host_id);
                AdminStayRequest {
                    surfer_name: t.profiles.get(&r.surfer_id).and_then(|p| p.full_name.clone()),
                    host_address: host.map(|h| h.address.clone()),
                    host_owner_name: host.and_then(|h| t.owner_name(h)),
                    request: r.clone(),
                }
            })
            .collect();

        Ok((page, total))
    }

    fn delete_stay_request(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.write()?;
        let before = t.requests.len();
        t.requests.retain(|r| r.id != id);
        if t.requests.len() == before {
            return Ok(false);
        }
        for m in t.messages.iter_mut().filter(|m| m.stay_request_id == Some(id)) {
            m.stay_request_id = None;
        }
        for r in t.reviews.iter_mut().filter(|r| r.stay_request_id == Some(id)) {
            r.stay_request_id = None;
        }
        Ok(true)
    }

    fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut t = self.write()?;
        let created = Message {
            id: Uuid::now_v7(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            message: message.message,
            stay_request_id: message.stay_request_id,
            created_at: Utc::now(),
        };
        t.messages.push(created.clone());
        Ok(created)
    }

    fn messages_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Message>> {
        Ok(self
            .read()?
            .messages
            .iter()
            .rev()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect())
    }

    fn conversation(&self, a: Uuid, b: Uuid) -> StoreResult<Vec<Message>> {
        Ok(self
            .read()?
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
            })
            .cloned()
            .collect())
    }

    fn list_messages(&self) -> StoreResult<Vec<Message>> {
        Ok(self.read()?.messages.iter().rev().cloned().collect())
    }

    fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.write()?;
        let before = t.messages.len();
        t.messages.retain(|m| m.id != id);
        Ok(t.messages.len() != before)
    }

    fn create_surfer_review(&self, review: NewSurferReview) -> StoreResult<SurferReview> {
        let mut t = self.write()?;
        let created = SurferReview {
            id: Uuid::now_v7(),
            host_id: review.host_id,
            surfer_id: review.surfer_id,
            stay_request_id: review.stay_request_id,
            rating: review.rating,
            review_text: review.review_text,
            created_at: Utc::now(),
        };
        t.reviews.push(created.clone());
        Ok(created)
    }

    fn reviews_for_surfer(&self, surfer_id: Uuid) -> StoreResult<Vec<SurferReview>> {
        Ok(self
            .read()?
            .reviews
            .iter()
            .rev()
            .filter(|r| r.surfer_id == surfer_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(store: &MemoryStayStore, user_id: Uuid) -> HostProfile {
        store
            .create_host(NewHost {
                user_id,
                address: "Old Town, Bhubaneswar".into(),
                phone_number: "+91 90000 00000".into(),
                offerings: None,
                work_description: None,
                interests: vec![],
                image_url: None,
            })
            .unwrap()
    }

    #[test]
    fn ensure_profile_is_idempotent() {
        let store = MemoryStayStore::new();
        let id = Uuid::now_v7();
        store.ensure_profile(id, Some("Priya".into())).unwrap();
        let again = store.ensure_profile(id, Some("Someone Else".into())).unwrap();
        assert_eq!(again.full_name.as_deref(), Some("Priya"));
        assert_eq!(store.list_profiles().unwrap().len(), 1);
    }

    #[test]
    fn one_host_profile_per_user() {
        let store = MemoryStayStore::new();
        let user = Uuid::now_v7();
        host(&store, user);
        let err = store
            .create_host(NewHost {
                user_id: user,
                address: "x".into(),
                phone_number: "12345".into(),
                offerings: None,
                work_description: None,
                interests: vec![],
                image_url: None,
            })
            .unwrap_err();
        assert_eq!(err.error_code(), odisha_shared::ErrorCode::HostAlreadyExists);
    }

    #[test]
    fn deleting_a_host_orphans_its_requests() {
        let store = MemoryStayStore::new();
        let h = host(&store, Uuid::now_v7());
        let surfer = Uuid::now_v7();
        store
            .add_photo(NewHostPhoto { host_id: h.id, photo_url: "u".into(), caption: None })
            .unwrap();
        store
            .create_stay_request(NewStayRequest::pending(h.id, surfer, None))
            .unwrap();

        assert!(store.delete_host(h.id).unwrap());
        assert!(store.list_photos(h.id).unwrap().is_empty());

        let outgoing = store.outgoing_for_surfer(surfer).unwrap();
        assert_eq!(outgoing.len(), 1);
        assert!(outgoing[0].host.is_none());
    }

    #[test]
    fn deleting_a_request_unlinks_messages() {
        let store = MemoryStayStore::new();
        let h = host(&store, Uuid::now_v7());
        let surfer = Uuid::now_v7();
        let req = store
            .create_stay_request(NewStayRequest::pending(h.id, surfer, None))
            .unwrap();
        store
            .create_message(NewMessage {
                sender_id: surfer,
                receiver_id: h.user_id,
                message: "namaskar".into(),
                stay_request_id: Some(req.id),
            })
            .unwrap();

        assert!(store.delete_stay_request(req.id).unwrap());
        assert!(!store.delete_stay_request(req.id).unwrap());
        assert_eq!(store.list_messages().unwrap()[0].stay_request_id, None);
    }

    #[test]
    fn admin_listing_filters_and_pages() {
        let store = MemoryStayStore::new();
        let h = host(&store, Uuid::now_v7());
        let mut ids = Vec::new();
        for _ in 0..3 {
            let r = store
                .create_stay_request(NewStayRequest::pending(h.id, Uuid::now_v7(), None))
                .unwrap();
            ids.push(r.id);
        }
        store.set_stay_status(ids[0], None, StayStatus::Approved).unwrap();

        let (page, total) = store.list_stay_requests(Some(StayStatus::Pending), 0, 1).unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].request.id, ids[2]);
        assert_eq!(page[0].host_address.as_deref(), Some("Old Town, Bhubaneswar"));

        let (approved, total) = store.list_stay_requests(Some(StayStatus::Approved), 0, 10).unwrap();
        assert_eq!(total, 1);
        assert_eq!(approved[0].request.id, ids[0]);
    }

    #[test]
    fn conversation_is_oldest_first() {
        let store = MemoryStayStore::new();
        let (a, b, c) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        for (from, to, text) in [(a, b, "1"), (c, a, "x"), (b, a, "2")] {
            store
                .create_message(NewMessage {
                    sender_id: from,
                    receiver_id: to,
                    message: text.into(),
                    stay_request_id: None,
                })
                .unwrap();
        }

        let texts: Vec<String> = store.conversation(a, b).unwrap().into_iter().map(|m| m.message).collect();
        assert_eq!(texts, vec!["1", "2"]);
        assert_eq!(store.messages_for_user(a).unwrap()[0].message, "2");
    }
}
