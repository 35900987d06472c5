use serde_json::json;
use std::fmt::Display;

use anyhow::Error as anyhowError;
use axum::{http::StatusCode, response::IntoResponse};

use crate::models::chat_requests::ChatRequestStatus;

/// Failures of the chat-request state machine and its storage.
#[derive(Debug, thiserror::Error)]
pub enum ChatRequestError {
    #[error("Chat request already sent.")]
    DuplicatePending,
    #[error("Chat request not found.")]
    NotFound,
    #[error("Chat request was already {0}.")]
    AlreadyResolved(ChatRequestStatus),
    #[error("Only the receiver can respond to a chat request.")]
    NotReceiver,
    #[error("Cannot send a chat request to yourself.")]
    SelfRequest,
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
}

pub type ChatRequestResult<T> = Result<T, ChatRequestError>;

#[derive(Debug)]
pub enum AppError {
    // 400 bad request
    BadRequest(anyhowError),
    // 401 unauthorized
    Unauthorized(anyhowError),
    // 403 forbidden
    Forbidden(anyhowError),
    // 404 not found
    NotFound(anyhowError),
    // 500 internal server error
    InternalServerError(anyhowError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(e) => write!(f, "BadRequest: {}", e),
            AppError::Unauthorized(e) => write!(f, "Unauthorized: {}", e),
            AppError::Forbidden(e) => write!(f, "Forbidden: {}", e),
            AppError::NotFound(e) => write!(f, "NotFound: {}", e),
            AppError::InternalServerError(e) => write!(f, "InternalServerError: {}", e),
        }
    }
}

impl From<anyhowError> for AppError {
    fn from(e: anyhowError) -> Self {
        AppError::InternalServerError(e)
    }
}

impl From<ChatRequestError> for AppError {
    fn from(e: ChatRequestError) -> Self {
        match e {
            ChatRequestError::DuplicatePending
            | ChatRequestError::AlreadyResolved(_)
            | ChatRequestError::SelfRequest => AppError::BadRequest(e.into()),
            ChatRequestError::NotReceiver => AppError::Forbidden(e.into()),
            ChatRequestError::NotFound => AppError::NotFound(e.into()),
            ChatRequestError::StorageUnavailable(source) => {
                tracing::error!(error = %source, "chat request storage failure");
                AppError::InternalServerError(anyhow::anyhow!("Internal server error"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match &self {
            Self::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err.to_string()),
            Self::Forbidden(err) => (StatusCode::FORBIDDEN, err.to_string()),
            Self::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::InternalServerError(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        #[cfg(debug_assertions)]
        let error_response = json!({
            "error": {
                "message": error_message,
                "type": format!("{:?}", self),
            }
        });

        #[cfg(not(debug_assertions))]
        let error_response = json!({
            "error": {
                "message": if status == StatusCode::INTERNAL_SERVER_ERROR {
                    status.canonical_reason().unwrap_or("An error occurred").to_string()
                } else {
                    error_message
                },
            }
        });
        (status, axum::Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: ChatRequestError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn test_chat_request_errors_map_to_http_status() {
        assert_eq!(status_of(ChatRequestError::DuplicatePending), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ChatRequestError::SelfRequest), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ChatRequestError::AlreadyResolved(ChatRequestStatus::Rejected)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ChatRequestError::NotReceiver), StatusCode::FORBIDDEN);
        assert_eq!(status_of(ChatRequestError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ChatRequestError::StorageUnavailable(sqlx::Error::PoolTimedOut)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_details_are_not_leaked() {
        let err = AppError::from(ChatRequestError::StorageUnavailable(sqlx::Error::PoolClosed));
        assert!(!err.to_string().contains("pool"));
    }
}
