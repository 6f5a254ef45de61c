use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod domain;
pub mod events;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

use domain::TransitionPolicy;
use events::EventBus;
use odisha_shared::clients::minio::MinioClient;
use store::{MemoryStayStore, StayStore};

pub struct AppState {
    pub store: Arc<dyn StayStore>,
    pub events: EventBus,
    pub policy: TransitionPolicy,
    /// Photo uploads are unavailable without object storage.
    pub minio: Option<MinioClient>,
    pub metrics: Option<PrometheusHandle>,
    pub upload_limit: usize,
}

impl AppState {
    /// Self-contained state backed by the in-memory store.
    pub fn in_memory(policy: TransitionPolicy) -> Self {
        Self {
            store: Arc::new(MemoryStayStore::new()),
            events: EventBus::new(),
            policy,
            minio: None,
            metrics: None,
            upload_limit: config::AppConfig::default().max_upload_bytes,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.upload_limit;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Profiles
        .route("/profiles/me", get(routes::profiles::get_me).patch(routes::profiles::update_me))
        .route("/profiles/:id", get(routes::profiles::surfer_card))
        // Hosts
        .route("/hosts", get(routes::hosts::browse).post(routes::hosts::become_host))
        .route(
            "/hosts/me",
            get(routes::hosts::get_mine)
                .patch(routes::hosts::update_mine)
                .delete(routes::hosts::delete_mine),
        )
        .route("/hosts/me/photos", post(routes::photos::upload_photo))
        .route("/hosts/me/photos/:photo_id", delete(routes::photos::delete_photo))
        .route("/hosts/:id", get(routes::hosts::get_host))
        .route("/hosts/:id/photos", get(routes::photos::list_photos))
        // Stay requests
        .route("/stay-requests", post(routes::stay_requests::create))
        .route("/stay-requests/incoming", get(routes::stay_requests::incoming))
        .route("/stay-requests/outgoing", get(routes::stay_requests::outgoing))
        .route("/stay-requests/:id/accept", post(routes::stay_requests::accept))
        .route("/stay-requests/:id/reject", post(routes::stay_requests::reject))
        .route("/stay-requests/:id/review", post(routes::stay_requests::review_surfer))
        // Messages
        .route("/messages", get(routes::messages::list).post(routes::messages::send))
        .route("/messages/with/:user_id", get(routes::messages::conversation))
        // Notifications
        .route("/notifications/stream", get(routes::notifications::stream))
        // Admin
        .route("/admin/profiles", get(routes::profiles::admin_list))
        .route("/admin/profiles/:id", patch(routes::profiles::admin_update))
        .route("/admin/hosts", get(routes::hosts::admin_list))
        .route(
            "/admin/hosts/:id",
            patch(routes::hosts::admin_update).delete(routes::hosts::admin_delete),
        )
        .route("/admin/stay-requests", get(routes::admin::list_stay_requests))
        .route("/admin/stay-requests/:id", delete(routes::admin::delete_stay_request))
        .route("/admin/messages", get(routes::admin::list_messages))
        .route("/admin/messages/:id", delete(routes::admin::delete_message))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(axum::middleware::from_fn(odisha_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
