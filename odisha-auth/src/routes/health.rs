use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use odisha_shared::types::{HealthCheck, HealthResponse};

use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db = match state.db.get() {
        Ok(_) => HealthCheck::healthy("postgres"),
        Err(e) => HealthCheck::unhealthy("postgres", e.to_string()),
    };

    Json(HealthResponse::healthy("odisha-auth", env!("CARGO_PKG_VERSION")).with_checks(vec![db]))
}
