use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use odisha_shared::clients::rabbitmq::RabbitMQClient;
use odisha_shared::types::event::{payloads, routing_keys, Event};

use crate::services::profile_service;
use crate::AppState;

const USER_REGISTERED_QUEUE: &str = "odisha-stays.auth.user.registered";

/// Create a default profile for every newly registered user.
pub async fn listen_user_registered(
    state: Arc<AppState>,
    rabbitmq: RabbitMQClient,
) -> anyhow::Result<()> {
    let mut consumer = rabbitmq
        .subscribe(USER_REGISTERED_QUEUE, &[routing_keys::AUTH_USER_REGISTERED])
        .await?;

    tracing::info!("listening for auth.user.registered events");

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
                continue;
            }
        };

        match serde_json::from_slice::<Event<payloads::UserRegistered>>(&delivery.data) {
            Ok(event) => handle_user_registered(&state, event.data),
            Err(e) => {
                tracing::error!(error = %e, "failed to deserialize user.registered event");
            }
        }

        if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
            tracing::warn!(error = %e, "failed to ack user.registered delivery");
        }
    }

    Ok(())
}

fn handle_user_registered(state: &AppState, data: payloads::UserRegistered) {
    tracing::info!(
        credential_id = %data.credential_id,
        email = %data.email,
        "received user.registered event"
    );

    match profile_service::create_default_profile(state, data.credential_id, data.full_name) {
        Ok(profile) => tracing::info!(profile_id = %profile.id, "profile ready for new user"),
        Err(e) => tracing::error!(
            error = %e,
            credential_id = %data.credential_id,
            "failed to create default profile"
        ),
    }
}
