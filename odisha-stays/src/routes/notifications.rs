//! Live notification stream.
//!
//! `GET /notifications/stream[?types=stay_request.created,message.received]`
//!
//! Each SSE frame carries `event: <type>`, `id: <event id>` and the JSON event
//! as `data`. Only events addressed to the authenticated caller are sent.

use axum::extract::{Query, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use odisha_shared::errors::{AppError, AppResult};
use odisha_shared::types::auth::AuthUser;

use crate::events::{RelayEvent, RelayEventType};
use crate::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    /// Comma-separated event types. An unknown name rejects the request.
    pub types: Option<String>,
}

impl StreamQuery {
    fn parsed_types(&self) -> AppResult<Vec<RelayEventType>> {
        let Some(raw) = self.types.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.parse().map_err(AppError::bad_request))
            .collect()
    }
}

fn wants(types: &[RelayEventType], event: &RelayEvent) -> bool {
    types.is_empty() || types.contains(&event.event_type)
}

pub async fn stream(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StreamQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let types = query.parsed_types()?;
    let mut subscription = state.events.subscribe_for(user.id);

    tracing::info!(
        user_id = %user.id,
        types = query.types.as_deref().unwrap_or("*"),
        "notification stream connected"
    );

    let stream = async_stream::stream! {
        while let Some(event) = subscription.recv().await {
            if !wants(&types, &event) {
                continue;
            }

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(error = %e, event_id = %event.id, "failed to serialize relay event");
                    continue;
                }
            };

            yield Ok(SseEvent::default()
                .event(event.event_type.as_str())
                .id(event.id.clone())
                .data(json));
        }
        tracing::info!(user_id = %subscription.recipient(), "event bus closed, ending stream");
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use chrono::Utc;
    use uuid::Uuid;

    fn message_event() -> RelayEvent {
        RelayEvent::message_received(&Message {
            id: Uuid::now_v7(),
            sender_id: Uuid::now_v7(),
            receiver_id: Uuid::now_v7(),
            message: "namaskar".into(),
            stay_request_id: None,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn no_filter_passes_everything() {
        let query = StreamQuery::default();
        assert!(wants(&query.parsed_types().unwrap(), &message_event()));
    }

    #[test]
    fn type_filter_is_applied() {
        let query = StreamQuery { types: Some("stay_request.created, stay_request.decided".into()) };
        let types = query.parsed_types().unwrap();
        assert_eq!(types.len(), 2);
        assert!(!wants(&types, &message_event()));

        let query = StreamQuery { types: Some("message.received,".into()) };
        assert!(wants(&query.parsed_types().unwrap(), &message_event()));
    }

    #[test]
    fn unknown_type_names_are_rejected() {
        for raw in ["bogus", "message.received,bogus"] {
            let query = StreamQuery { types: Some(raw.into()) };
            let err = query.parsed_types().unwrap_err();
            assert_eq!(err.error_code(), odisha_shared::errors::ErrorCode::BadRequest);
        }
    }
}
