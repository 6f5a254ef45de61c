//! Persistence seam for the stays service.
//!
//! Handlers and services talk to a [`StayStore`]; `PgStayStore` backs it with
//! diesel, `MemoryStayStore` keeps everything in process (selected with
//! `storage_backend = memory`, and used by the tests).

mod memory;
mod pg;

pub use memory::MemoryStayStore;
pub use pg::PgStayStore;

use uuid::Uuid;

use odisha_shared::errors::AppError;

use crate::domain::StayStatus;
use crate::models::{
    AdminStayRequest, HostListing, HostPatch, HostPhoto, HostProfile, IncomingRequest, Message,
    NewHost, NewHostPhoto, NewMessage, NewStayRequest, NewSurferReview, OutgoingRequest, Profile,
    ProfilePatch, StayRequest, SurferReview,
};

pub type StoreResult<T> = Result<T, AppError>;

/// Outcome of [`StayStore::set_stay_status`].
#[derive(Debug)]
pub enum StatusChange {
    Updated(StayRequest),
    /// Someone else moved the request first; carries the current row.
    Conflict(StayRequest),
    NotFound,
}

/// Calls are synchronous, like diesel itself. Every list is returned in the
/// order the API exposes it.
pub trait StayStore: Send + Sync {
    /// Round trip to the backing store.
    fn ping(&self) -> StoreResult<()>;

    // --- Profiles ---

    fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;
    /// Create the profile if missing. An existing profile is returned untouched.
    fn ensure_profile(&self, id: Uuid, full_name: Option<String>) -> StoreResult<Profile>;
    /// Create the profile if missing, then apply the patch.
    fn upsert_profile(&self, id: Uuid, patch: &ProfilePatch) -> StoreResult<Profile>;
    /// Apply the patch to an existing profile.
    fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> StoreResult<Option<Profile>>;
    /// Newest first.
    fn list_profiles(&self) -> StoreResult<Vec<Profile>>;

    // --- Hosts ---

    fn create_host(&self, host: NewHost) -> StoreResult<HostProfile>;
    fn get_host(&self, id: Uuid) -> StoreResult<Option<HostProfile>>;
    fn host_for_user(&self, user_id: Uuid) -> StoreResult<Option<HostProfile>>;
    /// Newest first, with owner names.
    fn list_hosts(&self) -> StoreResult<Vec<HostListing>>;
    fn update_host(&self, id: Uuid, patch: &HostPatch) -> StoreResult<Option<HostProfile>>;
    /// Removes the host and its photos. Stay requests addressed to it are kept.
    fn delete_host(&self, id: Uuid) -> StoreResult<bool>;

    // --- Host photos ---

    fn add_photo(&self, photo: NewHostPhoto) -> StoreResult<HostPhoto>;
    fn get_photo(&self, id: Uuid) -> StoreResult<Option<HostPhoto>>;
    /// Newest first.
    fn list_photos(&self, host_id: Uuid) -> StoreResult<Vec<HostPhoto>>;
    fn delete_photo(&self, id: Uuid) -> StoreResult<bool>;

    // --- Stay requests ---

    fn create_stay_request(&self, request: NewStayRequest) -> StoreResult<StayRequest>;
    fn get_stay_request(&self, id: Uuid) -> StoreResult<Option<StayRequest>>;
    /// Write `status`, but only while the request is still in `expected`
    /// (`None` writes unconditionally). The check and the write are atomic.
    fn set_stay_status(
        &self,
        id: Uuid,
        expected: Option<StayStatus>,
        status: StayStatus,
    ) -> StoreResult<StatusChange>;
    /// Requests addressed to a host, newest first, with surfer display fields.
    fn incoming_for_host(&self, host_id: Uuid) -> StoreResult<Vec<IncomingRequest>>;
    /// Requests sent by a surfer, newest first, with host summaries.
    fn outgoing_for_surfer(&self, surfer_id: Uuid) -> StoreResult<Vec<OutgoingRequest>>;
    /// One page of all requests, newest first, and the total matching the filter.
    fn list_stay_requests(
        &self,
        status: Option<StayStatus>,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<AdminStayRequest>, u64)>;
    /// Hard delete. Messages referencing the request lose the link.
    fn delete_stay_request(&self, id: Uuid) -> StoreResult<bool>;

    // --- Messages ---

    fn create_message(&self, message: NewMessage) -> StoreResult<Message>;
    /// Sent and received, newest first.
    fn messages_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Message>>;
    /// Both directions between two users, oldest first.
    fn conversation(&self, a: Uuid, b: Uuid) -> StoreResult<Vec<Message>>;
    /// Newest first.
    fn list_messages(&self) -> StoreResult<Vec<Message>>;
    fn delete_message(&self, id: Uuid) -> StoreResult<bool>;

    // --- Surfer reviews ---

    fn create_surfer_review(&self, review: NewSurferReview) -> StoreResult<SurferReview>;
    /// Newest first.
    fn reviews_for_surfer(&self, surfer_id: Uuid) -> StoreResult<Vec<SurferReview>>;
}
