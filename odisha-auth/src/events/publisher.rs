use uuid::Uuid;

use odisha_shared::clients::rabbitmq::RabbitMQClient;
use odisha_shared::types::auth::UserRole;
use odisha_shared::types::event::{payloads, routing_keys, Event};

const SOURCE: &str = "odisha-auth";

pub async fn publish_user_registered(
    rabbitmq: &RabbitMQClient,
    credential_id: Uuid,
    email: &str,
    full_name: Option<String>,
) {
    let event = Event::new(
        SOURCE,
        routing_keys::AUTH_USER_REGISTERED,
        payloads::UserRegistered {
            credential_id,
            email: email.to_string(),
            full_name,
        },
    )
    .with_user(credential_id);

    rabbitmq.publish_or_log(&event).await;
}

pub async fn publish_role_changed(
    rabbitmq: &RabbitMQClient,
    changed_by: Uuid,
    user_id: Uuid,
    role: UserRole,
) {
    let event = Event::new(
        SOURCE,
        routing_keys::AUTH_ROLE_CHANGED,
        payloads::RoleChanged { user_id, role },
    )
    .with_user(changed_by);

    rabbitmq.publish_or_log(&event).await;
}
