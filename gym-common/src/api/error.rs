//! Error responses
//!
//! Every failure is rendered as `{"error": {"code": ..., "message": ...}}`.
//! Storage and configuration failures are logged and returned without
//! detail.

use crate::{Error, ErrorKind};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be parsed or failed validation (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or wrong member credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Workflow or storage error
    #[error(transparent)]
    Gym(#[from] Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Gym(err) => match err {
                Error::AlreadyRegistered => (StatusCode::CONFLICT, "ALREADY_REGISTERED", err.to_string()),
                Error::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", err.to_string())
                }
                _ => match err.kind() {
                    ErrorKind::Lookup => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                    ErrorKind::Input => (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string()),
                    ErrorKind::Transactional => (StatusCode::CONFLICT, "ROLLED_BACK", err.to_string()),
                    ErrorKind::Storage | ErrorKind::Config => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "Internal server error".to_string(),
                    ),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.parts().0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(Error::PlanNotFound("Gold".into()).into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::MemberNotFound(3).into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::InvalidInput("x".into()).into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::AlreadyRegistered.into()), StatusCode::CONFLICT);
        assert_eq!(status_of(Error::InvalidCredentials.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(Error::DeletionFailed { member_id: 1, reason: "member not found".into() }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(Error::Internal("boom".into()).into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_hidden() {
        let (_, code, message) = ApiError::from(Error::Internal("secret path".into())).parts();
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("secret"));
    }
}
