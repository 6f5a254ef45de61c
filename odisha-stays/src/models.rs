use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use odisha_shared::errors::AppError;

use crate::domain::StayStatus;
use crate::schema::{host_photos, messages, profiles, stay_requests, stays_hosts, surfer_reviews};

// --- Profiles ---

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub hometown: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub languages_spoken: Vec<String>,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn empty(id: Uuid, full_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            full_name,
            bio: None,
            hometown: None,
            date_of_birth: None,
            avatar_url: None,
            languages_spoken: Vec::new(),
            interests: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(v) = &patch.full_name { self.full_name = Some(v.clone()); }
        if let Some(v) = &patch.bio { self.bio = Some(v.clone()); }
        if let Some(v) = &patch.hometown { self.hometown = Some(v.clone()); }
        if let Some(v) = patch.date_of_birth { self.date_of_birth = Some(v); }
        if let Some(v) = &patch.avatar_url { self.avatar_url = Some(v.clone()); }
        if let Some(v) = &patch.languages_spoken { self.languages_spoken = v.clone(); }
        if let Some(v) = &patch.interests { self.interests = v.clone(); }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Clone, AsChangeset, Deserialize, Validate)]
#[diesel(table_name = profiles)]
pub struct ProfilePatch {
    #[validate(length(min = 1, max = 120, message = "full name must be 1-120 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 2000, message = "bio is too long"))]
    pub bio: Option<String>,
    pub hometown: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(url(message = "avatar_url must be a URL"))]
    pub avatar_url: Option<String>,
    pub languages_spoken: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
}

// --- Hosts ---

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = stays_hosts)]
pub struct HostProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub phone_number: String,
    pub offerings: Option<String>,
    pub work_description: Option<String>,
    pub interests: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HostProfile {
    pub fn apply(&mut self, patch: &HostPatch) {
        if let Some(v) = &patch.address { self.address = v.clone(); }
        if let Some(v) = &patch.phone_number { self.phone_number = v.clone(); }
        if let Some(v) = &patch.offerings { self.offerings = Some(v.clone()); }
        if let Some(v) = &patch.work_description { self.work_description = Some(v.clone()); }
        if let Some(v) = &patch.interests { self.interests = v.clone(); }
        if let Some(v) = &patch.image_url { self.image_url = Some(v.clone()); }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stays_hosts)]
pub struct NewHost {
    pub user_id: Uuid,
    pub address: String,
    pub phone_number: String,
    pub offerings: Option<String>,
    pub work_description: Option<String>,
    pub interests: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Clone, AsChangeset, Deserialize, Validate)]
#[diesel(table_name = stays_hosts)]
pub struct HostPatch {
    #[validate(length(min = 1, message = "address cannot be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 5, max = 20, message = "phone number must be 5-20 characters"))]
    pub phone_number: Option<String>,
    pub offerings: Option<String>,
    pub work_description: Option<String>,
    pub interests: Option<Vec<String>>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

/// A host as shown when browsing, with the owner's display name.
#[derive(Debug, Clone, Serialize)]
pub struct HostListing {
    #[serde(flatten)]
    pub host: HostProfile,
    pub owner_name: Option<String>,
}

// --- Host photos ---

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = host_photos)]
pub struct HostPhoto {
    pub id: Uuid,
    pub host_id: Uuid,
    pub photo_url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = host_photos)]
pub struct NewHostPhoto {
    pub host_id: Uuid,
    pub photo_url: String,
    pub caption: Option<String>,
}

// --- Stay requests ---

#[derive(Debug, Clone, Serialize)]
pub struct StayRequest {
    pub id: Uuid,
    pub host_id: Uuid,
    pub surfer_id: Uuid,
    pub message: Option<String>,
    pub status: StayStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = stay_requests)]
pub struct StayRequestRow {
    pub id: Uuid,
    pub host_id: Uuid,
    pub surfer_id: Uuid,
    pub message: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StayRequestRow> for StayRequest {
    type Error = AppError;

    fn try_from(row: StayRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: StayStatus::from_column(row.status.as_deref())?,
            id: row.id,
            host_id: row.host_id,
            surfer_id: row.surfer_id,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stay_requests)]
pub struct NewStayRequest {
    pub host_id: Uuid,
    pub surfer_id: Uuid,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl NewStayRequest {
    pub fn pending(host_id: Uuid, surfer_id: Uuid, message: Option<String>) -> Self {
        Self {
            host_id,
            surfer_id,
            message,
            status: Some(StayStatus::Pending.as_str().to_string()),
        }
    }
}

/// Surfer display fields joined onto a host's inbox entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SurferSummary {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub hometown: Option<String>,
}

impl From<&Profile> for SurferSummary {
    fn from(p: &Profile) -> Self {
        Self {
            full_name: p.full_name.clone(),
            bio: p.bio.clone(),
            hometown: p.hometown.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IncomingRequest {
    #[serde(flatten)]
    pub request: StayRequest,
    pub surfer: SurferSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostSummary {
    pub address: String,
    pub owner_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingRequest {
    #[serde(flatten)]
    pub request: StayRequest,
    /// `None` once the host profile has been deleted.
    pub host: Option<HostSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStayRequest {
    #[serde(flatten)]
    pub request: StayRequest,
    pub surfer_name: Option<String>,
    pub host_address: Option<String>,
    pub host_owner_name: Option<String>,
}

// --- Messages ---

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub stay_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub stay_request_id: Option<Uuid>,
}

// --- Surfer reviews ---

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = surfer_reviews)]
pub struct SurferReview {
    pub id: Uuid,
    pub host_id: Uuid,
    pub surfer_id: Uuid,
    pub stay_request_id: Option<Uuid>,
    pub rating: i32,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = surfer_reviews)]
pub struct NewSurferReview {
    pub host_id: Uuid,
    pub surfer_id: Uuid,
    pub stay_request_id: Option<Uuid>,
    pub rating: i32,
    pub review_text: String,
}
