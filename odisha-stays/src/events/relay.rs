// In-process notification relay.
//
// Every user-facing alert (a new stay request for a host, a decision for a
// surfer, a new message) is a `RelayEvent` addressed to exactly one recipient.
// A single `EventBus` backed by `tokio::sync::broadcast` fans events out; each
// consumer holds a `RecipientSubscription` that only yields its own events.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::StayStatus;
use crate::models::{Message, StayRequest};

pub const DEFAULT_CAPACITY: usize = 1024;

/// Display name used when the surfer has no profile name yet.
pub const ANONYMOUS_SURFER: &str = "Someone";

const MESSAGE_PREVIEW_CHARS: usize = 120;

// --- Event types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayEventType {
    #[serde(rename = "stay_request.created")]
    StayRequestCreated,
    #[serde(rename = "stay_request.decided")]
    StayRequestDecided,
    #[serde(rename = "message.received")]
    MessageReceived,
}

impl RelayEventType {
    /// Used for SSE `event:` fields and `types` filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StayRequestCreated => "stay_request.created",
            Self::StayRequestDecided => "stay_request.decided",
            Self::MessageReceived => "message.received",
        }
    }
}

impl std::fmt::Display for RelayEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelayEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stay_request.created" => Ok(Self::StayRequestCreated),
            "stay_request.decided" => Ok(Self::StayRequestDecided),
            "message.received" => Ok(Self::MessageReceived),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayRequestCreatedPayload {
    pub stay_request_id: Uuid,
    pub host_id: Uuid,
    pub surfer_id: Uuid,
    pub surfer_name: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayRequestDecidedPayload {
    pub stay_request_id: Uuid,
    pub host_id: Uuid,
    pub status: StayStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReceivedPayload {
    pub message_id: Uuid,
    pub sender_id: Uuid,
    pub stay_request_id: Option<Uuid>,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayPayload {
    StayRequestCreated(StayRequestCreatedPayload),
    StayRequestDecided(StayRequestDecidedPayload),
    MessageReceived(MessageReceivedPayload),
}

// --- Envelope ---

/// ```json
/// {
///   "id": "evt_0190a1b2-...",
///   "type": "stay_request.created",
///   "created_at": "2024-06-15T14:22:33.123Z",
///   "recipient_id": "0190...",
///   "data": { "stay_request_id": "...", "surfer_name": "Priya", ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: RelayEventType,
    pub created_at: DateTime<Utc>,
    pub recipient_id: Uuid,
    pub data: RelayPayload,
}

impl RelayEvent {
    /// Alert for the host owner that a surfer asked to stay.
    pub fn stay_request_created(host_user_id: Uuid, request: &StayRequest, surfer_name: Option<String>) -> Self {
        Self::new(
            RelayEventType::StayRequestCreated,
            host_user_id,
            RelayPayload::StayRequestCreated(StayRequestCreatedPayload {
                stay_request_id: request.id,
                host_id: request.host_id,
                surfer_id: request.surfer_id,
                surfer_name: surfer_name.unwrap_or_else(|| ANONYMOUS_SURFER.to_string()),
                message: request.message.clone(),
            }),
        )
    }

    /// Alert for the surfer that their request was approved or rejected.
    pub fn stay_request_decided(request: &StayRequest) -> Self {
        Self::new(
            RelayEventType::StayRequestDecided,
            request.surfer_id,
            RelayPayload::StayRequestDecided(StayRequestDecidedPayload {
                stay_request_id: request.id,
                host_id: request.host_id,
                status: request.status,
            }),
        )
    }

    pub fn message_received(message: &Message) -> Self {
        Self::new(
            RelayEventType::MessageReceived,
            message.receiver_id,
            RelayPayload::MessageReceived(MessageReceivedPayload {
                message_id: message.id,
                sender_id: message.sender_id,
                stay_request_id: message.stay_request_id,
                preview: message.message.chars().take(MESSAGE_PREVIEW_CHARS).collect(),
            }),
        )
    }

    fn new(event_type: RelayEventType, recipient_id: Uuid, data: RelayPayload) -> Self {
        Self {
            id: format!("evt_{}", Uuid::new_v4()),
            event_type,
            created_at: Utc::now(),
            recipient_id,
            data,
        }
    }
}

// --- EventBus ---

/// Broadcast fan-out for [`RelayEvent`]s. Cheap to clone.
///
/// Subscribers lagging more than the capacity skip the missed events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RelayEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Returns how many live subscriptions saw it (before
    /// recipient filtering); having none is not an error.
    pub fn emit(&self, event: RelayEvent) -> usize {
        debug!(
            event_type = %event.event_type,
            event_id = %event.id,
            recipient_id = %event.recipient_id,
            "relay event emitted"
        );
        counter!("relay_events_emitted_total", "type" => event.event_type.as_str()).increment(1);
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events addressed to `recipient`, from now on.
    pub fn subscribe_for(&self, recipient: Uuid) -> RecipientSubscription {
        RecipientSubscription {
            recipient,
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription. Dropping it unsubscribes.
pub struct RecipientSubscription {
    recipient: Uuid,
    rx: broadcast::Receiver<RelayEvent>,
}

impl RecipientSubscription {
    pub fn recipient(&self) -> Uuid {
        self.recipient
    }

    /// Wait for the next event addressed to this recipient. `None` once the
    /// bus is gone.
    pub async fn recv(&mut self) -> Option<RelayEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.recipient_id == self.recipient => return Some(delivered(event)),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(recipient_id = %self.recipient, skipped = n, "relay subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`RecipientSubscription::recv`].
    pub fn try_recv(&mut self) -> Option<RelayEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.recipient_id == self.recipient => return Some(delivered(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(recipient_id = %self.recipient, skipped = n, "relay subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

fn delivered(event: RelayEvent) -> RelayEvent {
    counter!("relay_notifications_delivered_total", "type" => event.event_type.as_str()).increment(1);
    event
}
