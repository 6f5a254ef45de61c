use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Stable error codes reported to clients as `E{service}{sequence}`:
/// E0 shared, E1 auth, E2 content, E3 stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // E0
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    BadRequest,
    PayloadTooLarge,

    // E1
    InvalidCredentials,
    EmailAlreadyExists,
    TokenExpired,
    TokenInvalid,
    RefreshTokenRevoked,
    PasswordTooWeak,

    // E2
    ContentNotFound,
    UnknownContentKind,
    AlreadySaved,
    InvalidRating,

    // E3
    ProfileNotFound,
    HostNotFound,
    HostAlreadyExists,
    StayRequestNotFound,
    InvalidStayStatus,
    StayAlreadyDecided,
    CannotRequestOwnStay,
    MessageNotFound,
    CannotMessageSelf,
    NotStayParticipant,
    PhotoNotFound,
    PhotoUploadFailed,
    ReviewNotAllowed,
}

impl ErrorCode {
    fn meta(self) -> (&'static str, StatusCode) {
        use StatusCode as S;
        match self {
            Self::InternalError => ("E0001", S::INTERNAL_SERVER_ERROR),
            Self::ValidationError => ("E0002", S::BAD_REQUEST),
            Self::NotFound => ("E0003", S::NOT_FOUND),
            Self::Unauthorized => ("E0004", S::UNAUTHORIZED),
            Self::Forbidden => ("E0005", S::FORBIDDEN),
            Self::ServiceUnavailable => ("E0006", S::SERVICE_UNAVAILABLE),
            Self::BadRequest => ("E0007", S::BAD_REQUEST),
            Self::PayloadTooLarge => ("E0008", S::PAYLOAD_TOO_LARGE),

            Self::InvalidCredentials => ("E1001", S::UNAUTHORIZED),
            Self::EmailAlreadyExists => ("E1002", S::CONFLICT),
            Self::TokenExpired => ("E1003", S::UNAUTHORIZED),
            Self::TokenInvalid => ("E1004", S::UNAUTHORIZED),
            Self::RefreshTokenRevoked => ("E1005", S::UNAUTHORIZED),
            Self::PasswordTooWeak => ("E1006", S::BAD_REQUEST),

            Self::ContentNotFound => ("E2001", S::NOT_FOUND),
            Self::UnknownContentKind => ("E2002", S::BAD_REQUEST),
            Self::AlreadySaved => ("E2003", S::CONFLICT),
            Self::InvalidRating => ("E2004", S::BAD_REQUEST),

            Self::ProfileNotFound => ("E3001", S::NOT_FOUND),
            Self::HostNotFound => ("E3002", S::NOT_FOUND),
            Self::HostAlreadyExists => ("E3003", S::CONFLICT),
            Self::StayRequestNotFound => ("E3004", S::NOT_FOUND),
            Self::InvalidStayStatus => ("E3005", S::BAD_REQUEST),
            Self::StayAlreadyDecided => ("E3006", S::CONFLICT),
            Self::CannotRequestOwnStay => ("E3007", S::FORBIDDEN),
            Self::MessageNotFound => ("E3008", S::NOT_FOUND),
            Self::CannotMessageSelf => ("E3009", S::FORBIDDEN),
            Self::NotStayParticipant => ("E3010", S::FORBIDDEN),
            Self::PhotoNotFound => ("E3011", S::NOT_FOUND),
            Self::PhotoUploadFailed => ("E3012", S::BAD_REQUEST),
            Self::ReviewNotAllowed => ("E3013", S::FORBIDDEN),
        }
    }

    pub fn code(&self) -> &'static str {
        self.meta().0
    }

    pub fn status_code(&self) -> StatusCode {
        self.meta().1
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known { code, message: message.into(), details: None }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known { code, message: message.into(), details: Some(details) }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The code clients see for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Known { code, .. } => *code,
            Self::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            Self::Internal(_) | Self::Database(_) => ErrorCode::InternalError,
            Self::Validation(_) => ErrorCode::ValidationError,
        }
    }

    /// Client-facing message. Internal causes are logged, never returned.
    fn public_message(&self) -> String {
        match self {
            Self::Known { message, .. } | Self::Validation(message) => message.clone(),
            Self::Database(diesel::result::Error::NotFound) => "resource not found".into(),
            Self::Internal(_) | Self::Database(_) => "internal server error".into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        if code.status_code().is_server_error() {
            tracing::error!(error = %self, code = code.code(), "request failed");
        }

        let mut body = ApiErrorResponse::new(code.code(), self.public_message());
        if let Self::Known { details: Some(details), .. } = self {
            body = body.with_details(details);
        }

        (code.status_code(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let err = AppError::new(ErrorCode::StayAlreadyDecided, "stay request already decided");
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "E3006");
        assert_eq!(json["error"]["message"], "stay request already decided");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn details_are_serialized() {
        let err = AppError::with_details(
            ErrorCode::ValidationError,
            "bad input",
            serde_json::json!({ "field": "rating" }),
        );
        let (_, json) = body_json(err).await;
        assert_eq!(json["error"]["details"]["field"], "rating");
    }

    #[tokio::test]
    async fn internal_causes_are_hidden() {
        let (status, json) = body_json(AppError::Internal(anyhow::anyhow!("pool timed out"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "internal server error");

        let (status, json) = body_json(AppError::Database(diesel::result::Error::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "E0003");
    }

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::InternalError, ErrorCode::ValidationError, ErrorCode::NotFound,
            ErrorCode::Unauthorized, ErrorCode::Forbidden, ErrorCode::ServiceUnavailable,
            ErrorCode::BadRequest, ErrorCode::PayloadTooLarge, ErrorCode::InvalidCredentials,
            ErrorCode::EmailAlreadyExists, ErrorCode::TokenExpired, ErrorCode::TokenInvalid,
            ErrorCode::RefreshTokenRevoked, ErrorCode::PasswordTooWeak, ErrorCode::ContentNotFound,
            ErrorCode::UnknownContentKind, ErrorCode::AlreadySaved, ErrorCode::InvalidRating,
            ErrorCode::ProfileNotFound, ErrorCode::HostNotFound, ErrorCode::HostAlreadyExists,
            ErrorCode::StayRequestNotFound, ErrorCode::InvalidStayStatus,
            ErrorCode::StayAlreadyDecided, ErrorCode::CannotRequestOwnStay,
            ErrorCode::MessageNotFound, ErrorCode::CannotMessageSelf,
            ErrorCode::NotStayParticipant, ErrorCode::PhotoNotFound,
            ErrorCode::PhotoUploadFailed, ErrorCode::ReviewNotAllowed,
        ];
        let codes: std::collections::HashSet<&str> = all.iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), all.len());
    }
}
