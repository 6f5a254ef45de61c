use std::collections::HashMap;

use chrono::Utc;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use uuid::Uuid;

use odisha_shared::clients::db::DbPool;
use odisha_shared::errors::{AppError, ErrorCode};

use super::{StatusChange, StayStore, StoreResult};
use crate::domain::StayStatus;
use crate::models::{
    AdminStayRequest, HostListing, HostPatch, HostPhoto, HostProfile, HostSummary,
    IncomingRequest, Message, NewHost, NewHostPhoto, NewMessage, NewProfile, NewStayRequest,
    NewSurferReview, OutgoingRequest, Profile, ProfilePatch, StayRequest, StayRequestRow,
    SurferReview, SurferSummary,
};
use crate::schema::{host_photos, messages, profiles, stay_requests, stays_hosts, surfer_reviews};

type Conn = PooledConnection<ConnectionManager<PgConnection>>;

pub struct PgStayStore {
    pool: DbPool,
}

impl PgStayStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<Conn> {
        self.pool.get().map_err(|e| AppError::internal(e.to_string()))
    }
}

fn to_requests(rows: Vec<StayRequestRow>) -> StoreResult<Vec<StayRequest>> {
    rows.into_iter().map(StayRequest::try_from).collect()
}

fn profiles_by_id(conn: &mut PgConnection, ids: Vec<Uuid>) -> StoreResult<HashMap<Uuid, Profile>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<Profile> = profiles::table
        .filter(profiles::id.eq_any(ids))
        .select(Profile::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(|p| (p.id, p)).collect())
}

fn hosts_by_id(conn: &mut PgConnection, ids: Vec<Uuid>) -> StoreResult<HashMap<Uuid, HostProfile>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<HostProfile> = stays_hosts::table
        .filter(stays_hosts::id.eq_any(ids))
        .select(HostProfile::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(|h| (h.id, h)).collect())
}

fn full_name(profiles: &HashMap<Uuid, Profile>, id: Uuid) -> Option<String> {
    profiles.get(&id).and_then(|p| p.full_name.clone())
}

fn status_filter(status: Option<StayStatus>) -> stay_requests::BoxedQuery<'static, Pg> {
    let query = stay_requests::table.into_boxed();
    match status {
        None => query,
        Some(StayStatus::Pending) => query.filter(
            stay_requests::status
                .eq("pending")
                .or(stay_requests::status.is_null()),
        ),
        Some(StayStatus::Approved) => {
            query.filter(stay_requests::status.eq_any(["approved", "accepted"]))
        }
        Some(StayStatus::Rejected) => query.filter(stay_requests::status.eq("rejected")),
    }
}

fn map_host_conflict(err: diesel::result::Error) -> AppError {
    match err {
        diesel::result::Error::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _) => {
            AppError::new(ErrorCode::HostAlreadyExists, "user already has a host profile")
        }
        other => other.into(),
    }
}

impl StayStore for PgStayStore {
    fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    // --- Profiles ---

    fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let mut conn = self.conn()?;
        Ok(profiles::table
            .find(id)
            .select(Profile::as_select())
            .first(&mut conn)
            .optional()?)
    }

    fn ensure_profile(&self, id: Uuid, full_name: Option<String>) -> StoreResult<Profile> {
        let mut conn = self.conn()?;
        diesel::insert_into(profiles::table)
            .values(&NewProfile { id, full_name })
            .on_conflict_do_nothing()
            .execute(&mut conn)?;
        Ok(profiles::table
            .find(id)
            .select(Profile::as_select())
            .first(&mut conn)?)
    }

    fn upsert_profile(&self, id: Uuid, patch: &ProfilePatch) -> StoreResult<Profile> {
        let mut conn = self.conn()?;
        let profile = conn.transaction(|conn| {
            diesel::insert_into(profiles::table)
                .values(&NewProfile { id, full_name: None })
                .on_conflict_do_nothing()
                .execute(conn)?;
            diesel::update(profiles::table.find(id))
                .set((patch, profiles::updated_at.eq(Utc::now())))
                .returning(Profile::as_returning())
                .get_result(conn)
        })?;
        Ok(profile)
    }

    fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> StoreResult<Option<Profile>> {
        let mut conn = self.conn()?;
        Ok(diesel::update(profiles::table.find(id))
            .set((patch, profiles::updated_at.eq(Utc::now())))
            .returning(Profile::as_returning())
            .get_result(&mut conn)
            .optional()?)
    }

    fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        let mut conn = self.conn()?;
        Ok(profiles::table
            .order(profiles::created_at.desc())
            .select(Profile::as_select())
            .load(&mut conn)?)
    }

    // --- Hosts ---

    fn create_host(&self, host: NewHost) -> StoreResult<HostProfile> {
        let mut conn = self.conn()?;
        diesel::insert_into(stays_hosts::table)
            .values(&host)
            .returning(HostProfile::as_returning())
            .get_result(&mut conn)
            .map_err(map_host_conflict)
    }

    fn get_host(&self, id: Uuid) -> StoreResult<Option<HostProfile>> {
        let mut conn = self.conn()?;
        Ok(stays_hosts::table
            .find(id)
            .select(HostProfile::as_select())
            .first(&mut conn)
            .optional()?)
    }

    fn host_for_user(&self, user_id: Uuid) -> StoreResult<Option<HostProfile>> {
        let mut conn = self.conn()?;
        Ok(stays_hosts::table
            .filter(stays_hosts::user_id.eq(user_id))
            .select(HostProfile::as_select())
            .first(&mut conn)
            .optional()?)
    }

    fn list_hosts(&self) -> StoreResult<Vec<HostListing>> {
        let mut conn = self.conn()?;
        let hosts: Vec<HostProfile> = stays_hosts::table
            .order(stays_hosts::created_at.desc())
            .select(HostProfile::as_select())
            .load(&mut conn)?;

        let owner_ids: Vec<Uuid> = hosts.iter().map(|h| h.user_id).collect();
        let owners = profiles_by_id(&mut conn, owner_ids)?;

        Ok(hosts
            .into_iter()
            .map(|host| HostListing {
                owner_name: full_name(&owners, host.user_id),
                host,
            })
            .collect())
    }

    fn update_host(&self, id: Uuid, patch: &HostPatch) -> StoreResult<Option<HostProfile>> {
        let mut conn = self.conn()?;
        Ok(diesel::update(stays_hosts::table.find(id))
            .set((patch, stays_hosts::updated_at.eq(Utc::now())))
            .returning(HostProfile::as_returning())
            .get_result(&mut conn)
            .optional()?)
    }

    fn delete_host(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        // host_photos cascade; stay_requests have no foreign key
        let deleted = diesel::delete(stays_hosts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    // --- Host photos ---

    fn add_photo(&self, photo: NewHostPhoto) -> StoreResult<HostPhoto> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(host_photos::table)
            .values(&photo)
            .returning(HostPhoto::as_returning())
            .get_result(&mut conn)?)
    }

    fn get_photo(&self, id: Uuid) -> StoreResult<Option<HostPhoto>> {
        let mut conn = self.conn()?;
        Ok(host_photos::table
            .find(id)
            .select(HostPhoto::as_select())
            .first(&mut conn)
            .optional()?)
    }

    fn list_photos(&self, host_id: Uuid) -> StoreResult<Vec<HostPhoto>> {
        let mut conn = self.conn()?;
        Ok(host_photos::table
            .filter(host_photos::host_id.eq(host_id))
            .order(host_photos::created_at.desc())
            .select(HostPhoto::as_select())
            .load(&mut conn)?)
    }

    fn delete_photo(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        Ok(diesel::delete(host_photos::table.find(id)).execute(&mut conn)? > 0)
    }

    // --- Stay requests ---

    fn create_stay_request(&self, request: NewStayRequest) -> StoreResult<StayRequest> {
        let mut conn = self.conn()?;
        let row: StayRequestRow = diesel::insert_into(stay_requests::table)
            .values(&request)
            .returning(StayRequestRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn get_stay_request(&self, id: Uuid) -> StoreResult<Option<StayRequest>> {
        let mut conn = self.conn()?;
        stay_requests::table
            .find(id)
            .select(StayRequestRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(StayRequest::try_from)
            .transpose()
    }

    fn set_stay_status(
        &self,
        id: Uuid,
        expected: Option<StayStatus>,
        status: StayStatus,
    ) -> StoreResult<StatusChange> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let current: Option<StayRequestRow> = stay_requests::table
                .find(id)
                .select(StayRequestRow::as_select())
                .for_update()
                .first(conn)
                .optional()?;
            let Some(current) = current else {
                return Ok(StatusChange::NotFound);
            };
            let current = StayRequest::try_from(current)?;
            if expected.is_some_and(|e| e != current.status) {
                return Ok(StatusChange::Conflict(current));
            }

            let row: StayRequestRow = diesel::update(stay_requests::table.find(id))
                .set(stay_requests::status.eq(Some(status.as_str())))
                .returning(StayRequestRow::as_returning())
                .get_result(conn)?;
            Ok(StatusChange::Updated(StayRequest::try_from(row)?))
        })
    }

    fn incoming_for_host(&self, host_id: Uuid) -> StoreResult<Vec<IncomingRequest>> {
        let mut conn = self.conn()?;
        let rows: Vec<StayRequestRow> = stay_requests::table
            .filter(stay_requests::host_id.eq(host_id))
            .order(stay_requests::created_at.desc())
            .select(StayRequestRow::as_select())
            .load(&mut conn)?;
        let requests = to_requests(rows)?;

        let surfer_ids: Vec<Uuid> = requests.iter().map(|r| r.surfer_id).collect();
        let surfers = profiles_by_id(&mut conn, surfer_ids)?;

        Ok(requests
            .into_iter()
            .map(|request| IncomingRequest {
                surfer: surfers
                    .get(&request.surfer_id)
                    .map(SurferSummary::from)
                    .unwrap_or_default(),
                request,
            })
            .collect())
    }

    fn outgoing_for_surfer(&self, surfer_id: Uuid) -> StoreResult<Vec<OutgoingRequest>> {
        let mut conn = self.conn()?;
        let rows: Vec<StayRequestRow> = stay_requests::table
            .filter(stay_requests::surfer_id.eq(surfer_id))
            .order(stay_requests::created_at.desc())
            .select(StayRequestRow::as_select())
            .load(&mut conn)?;
        let requests = to_requests(rows)?;

        let host_ids: Vec<Uuid> = requests.iter().map(|r| r.host_id).collect();
        let hosts = hosts_by_id(&mut conn, host_ids)?;
        let owner_ids: Vec<Uuid> = hosts.values().map(|h| h.user_id).collect();
        let owners = profiles_by_id(&mut conn, owner_ids)?;

        Ok(requests
            .into_iter()
            .map(|request| OutgoingRequest {
                host: hosts.get(&request.host_id).map(|h| HostSummary {
                    address: h.address.clone(),
                    owner_name: full_name(&owners, h.user_id),
                }),
                request,
            })
            .collect())
    }

    fn list_stay_requests(
        &self,
        status: Option<StayStatus>,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<AdminStayRequest>, u64)> {
        let mut conn = self.conn()?;

        let total: i64 = status_filter(status).count().get_result(&mut conn)?;
        let rows: Vec<StayRequestRow> = status_filter(status)
            .order(stay_requests::created_at.desc())
            .offset(offset as i64)
            .limit(limit as i64)
            .select(StayRequestRow::as_select())
            .load(&mut conn)?;
        let requests = to_requests(rows)?;

        let host_ids: Vec<Uuid> = requests.iter().map(|r| r.host_id).collect();
        let hosts = hosts_by_id(&mut conn, host_ids)?;
        let people: Vec<Uuid> = requests
            .iter()
            .map(|r| r.surfer_id)
            .chain(hosts.values().map(|h| h.user_id))
            .collect();
        let names = profiles_by_id(&mut conn, people)?;

        let page = requests
            .into_iter()
            .map(|request| {
                let host = hosts.get(&request.host_id);
                AdminStayRequest {
                    surfer_name: full_name(&names, request.surfer_id),
                    host_address: host.map(|h| h.address.clone()),
                    host_owner_name: host.and_then(|h| full_name(&names, h.user_id)),
                    request,
                }
            })
            .collect();

        Ok((page, total as u64))
    }

    fn delete_stay_request(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        // messages and surfer_reviews are unlinked by ON DELETE SET NULL
        let deleted = diesel::delete(stay_requests::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    // --- Messages ---

    fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(messages::table)
            .values(&message)
            .returning(Message::as_returning())
            .get_result(&mut conn)?)
    }

    fn messages_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Message>> {
        let mut conn = self.conn()?;
        Ok(messages::table
            .filter(
                messages::sender_id
                    .eq(user_id)
                    .or(messages::receiver_id.eq(user_id)),
            )
            .order(messages::created_at.desc())
            .select(Message::as_select())
            .load(&mut conn)?)
    }

    fn conversation(&self, a: Uuid, b: Uuid) -> StoreResult<Vec<Message>> {
        let mut conn = self.conn()?;
        Ok(messages::table
            .filter(
                messages::sender_id
                    .eq(a)
                    .and(messages::receiver_id.eq(b))
                    .or(messages::sender_id.eq(b).and(messages::receiver_id.eq(a))),
            )
            .order(messages::created_at.asc())
            .select(Message::as_select())
            .load(&mut conn)?)
    }

    fn list_messages(&self) -> StoreResult<Vec<Message>> {
        let mut conn = self.conn()?;
        Ok(messages::table
            .order(messages::created_at.desc())
            .select(Message::as_select())
            .load(&mut conn)?)
    }

    fn delete_message(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        Ok(diesel::delete(messages::table.find(id)).execute(&mut conn)? > 0)
    }

    // --- Surfer reviews ---

    fn create_surfer_review(&self, review: NewSurferReview) -> StoreResult<SurferReview> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(surfer_reviews::table)
            .values(&review)
            .returning(SurferReview::as_returning())
            .get_result(&mut conn)?)
    }

    fn reviews_for_surfer(&self, surfer_id: Uuid) -> StoreResult<Vec<SurferReview>> {
        let mut conn = self.conn()?;
        Ok(surfer_reviews::table
            .filter(surfer_reviews::surfer_id.eq(surfer_id))
            .order(surfer_reviews::created_at.desc())
            .select(SurferReview::as_select())
            .load(&mut conn)?)
    }
}
