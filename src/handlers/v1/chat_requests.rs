use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{chat_requests::RelationshipStatusResponse, sessions::VerifiedUser},
};

#[derive(serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendChatRequestPayload {
    #[validate(length(min = 1, message = "Receiver ID cannot be empty"))]
    pub receiver_id: String,
}

fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(anyhow!("Invalid {} format", what)))
}

pub async fn send_chat_request(
    State(state): State<AppState>,
    user: VerifiedUser,
    Json(payload): Json<SendChatRequestPayload>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid chat request data: {}", e)))?;

    let receiver_id = parse_id(&payload.receiver_id, "receiver ID")?;
    let request = state.chat_requests.send(&user, receiver_id).await?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn get_chat_requests(
    State(state): State<AppState>,
    user: VerifiedUser,
) -> AppResult<impl IntoResponse> {
    let requests = state.chat_requests.list_pending_for_receiver(&user).await?;

    Ok((StatusCode::OK, Json(requests)))
}

pub async fn check_chat_request_status(
    State(state): State<AppState>,
    user: VerifiedUser,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let other_user_id = parse_id(&user_id, "user ID")?;
    let status = state
        .chat_requests
        .current_status(&user, other_user_id)
        .await?;

    Ok((StatusCode::OK, Json(RelationshipStatusResponse { status })))
}

pub async fn accept_chat_request(
    State(state): State<AppState>,
    user: VerifiedUser,
    Path(request_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let request_id = parse_id(&request_id, "request ID")?;
    let request = state.chat_requests.accept(&user, request_id).await?;

    Ok((StatusCode::OK, Json(request)))
}

pub async fn reject_chat_request(
    State(state): State<AppState>,
    user: VerifiedUser,
    Path(request_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let request_id = parse_id(&request_id, "request ID")?;
    let request = state.chat_requests.reject(&user, request_id).await?;

    Ok((StatusCode::OK, Json(request)))
}
