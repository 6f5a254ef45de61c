use uuid::Uuid;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};

use crate::events::RelayEvent;
use crate::models::{Message, NewMessage};
use crate::AppState;

pub const MAX_MESSAGE_CHARS: usize = 4000;

pub fn send(
    state: &AppState,
    sender_id: Uuid,
    receiver_id: Uuid,
    text: &str,
    stay_request_id: Option<Uuid>,
) -> AppResult<Message> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message cannot be empty"));
    }
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::new(ErrorCode::PayloadTooLarge, "message is too long"));
    }
    if sender_id == receiver_id {
        return Err(AppError::new(ErrorCode::CannotMessageSelf, "cannot send a message to yourself"));
    }

    if let Some(request_id) = stay_request_id {
        let request = state.store.get_stay_request(request_id)?.ok_or_else(|| {
            AppError::new(ErrorCode::StayRequestNotFound, format!("stay request {request_id} not found"))
        })?;
        let host_user = state.store.get_host(request.host_id)?.map(|h| h.user_id);

        let is_participant = |id: Uuid| id == request.surfer_id || Some(id) == host_user;
        if !is_participant(sender_id) || !is_participant(receiver_id) {
            return Err(AppError::new(
                ErrorCode::NotStayParticipant,
                "both users must be part of the stay request",
            ));
        }
    }

    let message = state.store.create_message(NewMessage {
        sender_id,
        receiver_id,
        message: text.to_string(),
        stay_request_id,
    })?;

    tracing::debug!(message_id = %message.id, sender_id = %sender_id, receiver_id = %receiver_id, "message sent");
    state.events.emit(RelayEvent::message_received(&message));

    Ok(message)
}

pub fn admin_delete(state: &AppState, admin_id: Uuid, message_id: Uuid) -> AppResult<()> {
    if !state.store.delete_message(message_id)? {
        return Err(AppError::new(ErrorCode::MessageNotFound, "message not found"));
    }
    tracing::info!(message_id = %message_id, admin_id = %admin_id, "message deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransitionPolicy;
    use crate::models::{NewHost, NewStayRequest};

    #[test]
    fn basic_rules() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        let err = send(&state, a, b, "   ", None).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
        let err = send(&state, a, a, "hello me", None).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::CannotMessageSelf);

        let sent = send(&state, a, b, " hello ", None).unwrap();
        assert_eq!(sent.message, "hello");
    }

    #[test]
    fn linked_messages_stay_between_participants() {
        let state = AppState::in_memory(TransitionPolicy::Strict);
        let (owner, surfer, stranger) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let host = state
            .store
            .create_host(NewHost {
                user_id: owner,
                address: "Chilika".into(),
                phone_number: "+91 90000 22222".into(),
                offerings: None,
                work_description: None,
                interests: vec![],
                image_url: None,
            })
            .unwrap();
        let req = state
            .store
            .create_stay_request(NewStayRequest::pending(host.id, surfer, None))
            .unwrap();

        assert!(send(&state, surfer, owner, "arriving at 6", Some(req.id)).is_ok());
        assert!(send(&state, owner, surfer, "see you", Some(req.id)).is_ok());

        let err = send(&state, stranger, owner, "hi", Some(req.id)).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotStayParticipant);

        let err = send(&state, surfer, owner, "hi", Some(Uuid::now_v7())).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::StayRequestNotFound);
    }
}
