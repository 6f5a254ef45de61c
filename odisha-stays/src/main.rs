use std::sync::Arc;

use odisha_shared::clients::db::create_pool;
use odisha_shared::clients::minio::MinioClient;
use odisha_shared::clients::rabbitmq::RabbitMQClient;
use odisha_stays::config::{AppConfig, StorageBackend};
use odisha_stays::events::{subscriber, EventBus};
use odisha_stays::store::{MemoryStayStore, PgStayStore, StayStore};
use odisha_stays::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    odisha_shared::middleware::init_tracing("odisha-stays");

    let config = AppConfig::load()?;
    let port = config.port;
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let metrics = odisha_shared::middleware::init_metrics()?;

    let (store, minio, rabbitmq) = match config.storage_backend {
        StorageBackend::Postgres => {
            let db = create_pool(&config.database_url, config.db_pool_size)?;
            let minio = MinioClient::new(
                &config.minio_endpoint,
                &config.minio_access_key,
                &config.minio_secret_key,
                &config.minio_bucket,
                &config.minio_public_url,
            )
            .await;
            let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
            (Arc::new(PgStayStore::new(db)) as Arc<dyn StayStore>, Some(minio), Some(rabbitmq))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory store, data is lost on restart");
            (Arc::new(MemoryStayStore::new()) as Arc<dyn StayStore>, None, None)
        }
    };

    let state = Arc::new(AppState {
        store,
        events: EventBus::with_capacity(config.event_bus_capacity),
        policy: config.transition_policy,
        minio,
        metrics: Some(metrics),
        upload_limit: config.max_upload_bytes,
    });

    if let Some(rabbitmq) = rabbitmq {
        let registered_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = subscriber::listen_user_registered(registered_state, rabbitmq).await {
                tracing::error!(error = %e, "user.registered subscriber failed");
            }
        });
    }

    let app = odisha_stays::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, policy = ?config.transition_policy, "odisha-stays starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
