use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for every domain event crossing the broker. The routing key is
/// `event_type`, shaped `odisha.{service}.{entity}.{action}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    /// Publishing service, e.g. `odisha-auth`.
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub correlation_id: Option<Uuid>,
    /// User whose action produced the event.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        let id = Uuid::now_v7();
        Self {
            id,
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: Some(id),
            user_id: None,
            data,
        }
    }

    pub fn with_user(self, user_id: Uuid) -> Self {
        Self { user_id: Some(user_id), ..self }
    }
}

pub mod routing_keys {
    pub const AUTH_USER_REGISTERED: &str = "odisha.auth.user.registered";
    pub const AUTH_ROLE_CHANGED: &str = "odisha.auth.role.changed";
}

pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use crate::types::UserRole;

    /// `credential_id` is the user id every other service keys on.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub credential_id: Uuid,
        pub email: String,
        #[serde(default)]
        pub full_name: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RoleChanged {
        pub user_id: Uuid,
        pub role: UserRole,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_event_tolerates_missing_optionals() {
        let raw = serde_json::json!({
            "id": Uuid::now_v7(),
            "source": "odisha-auth",
            "event_type": routing_keys::AUTH_USER_REGISTERED,
            "timestamp": Utc::now(),
            "data": { "credential_id": Uuid::now_v7(), "email": "a@b.in" }
        });
        let event: Event<payloads::UserRegistered> = serde_json::from_value(raw).unwrap();
        assert!(event.data.full_name.is_none());
        assert!(event.correlation_id.is_none());
        assert_eq!(event.data.email, "a@b.in");
    }

    #[test]
    fn new_events_correlate_to_themselves() {
        let user = Uuid::now_v7();
        let event = Event::new("odisha-auth", routing_keys::AUTH_ROLE_CHANGED, ()).with_user(user);
        assert_eq!(event.user_id, Some(user));
        assert_eq!(event.correlation_id, Some(event.id));
    }
}
