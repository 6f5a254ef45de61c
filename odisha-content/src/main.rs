use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;

use config::AppConfig;
use odisha_shared::clients::db::{create_pool, DbPool};
use routes::catalog::{districts, festivals, foods, places, tribes};

pub struct AppState {
    pub db: DbPool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    odisha_shared::middleware::init_tracing("odisha-content");

    let config = AppConfig::load()?;
    let port = config.port;
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let db = create_pool(&config.database_url, config.db_pool_size)?;
    let state = Arc::new(AppState { db });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Catalog
        .route("/places", get(places::list).post(places::create))
        .route("/places/:id", get(places::get).patch(places::update).delete(places::delete))
        .route("/foods", get(foods::list).post(foods::create))
        .route("/foods/:id", get(foods::get).patch(foods::update).delete(foods::delete))
        .route("/festivals", get(festivals::list).post(festivals::create))
        .route("/festivals/:id", get(festivals::get).patch(festivals::update).delete(festivals::delete))
        .route("/tribes", get(tribes::list).post(tribes::create))
        .route("/tribes/:id", get(tribes::get).patch(tribes::update).delete(tribes::delete))
        .route("/districts", get(districts::list).post(districts::create))
        .route("/districts/:id", get(districts::get).patch(districts::update).delete(districts::delete))
        // Saved items
        .route("/saved", get(routes::saved::list_saved))
        .route("/saved/ids", get(routes::saved::list_saved_ids))
        .route("/saved/:kind/:id/toggle", post(routes::saved::toggle_saved))
        .route("/saved/:kind/:id", axum::routing::delete(routes::saved::unsave))
        // Site reviews
        .route("/reviews", get(routes::reviews::list_reviews).post(routes::reviews::create_review))
        .layer(axum::middleware::from_fn(odisha_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "odisha-content starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
