use sqlx::postgres::PgConnection;
use uuid::Uuid;

use crate::{
    error::{ChatRequestError, ChatRequestResult},
    models::chat_requests::{ChatRequest, ChatRequestStatus},
};

pub async fn insert_chat_request(
    conn: &mut PgConnection,
    request: &ChatRequest,
) -> ChatRequestResult<ChatRequest> {
    sqlx::query_as::<_, ChatRequest>(
        "INSERT INTO chat_requests (id, sender_id, receiver_id, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, sender_id, receiver_id, status, created_at, updated_at",
    )
    .bind(request.id)
    .bind(request.sender_id)
    .bind(request.receiver_id)
    .bind(request.status)
    .bind(request.created_at)
    .bind(request.updated_at)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        // chat_requests_one_pending_per_pair
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            ChatRequestError::DuplicatePending
        }
        _ => ChatRequestError::StorageUnavailable(e),
    })
}

pub async fn get_chat_request_by_id(
    conn: &mut PgConnection,
    request_id: Uuid,
) -> ChatRequestResult<Option<ChatRequest>> {
    let request = sqlx::query_as::<_, ChatRequest>(
        "SELECT id, sender_id, receiver_id, status, created_at, updated_at \
         FROM chat_requests WHERE id = $1",
    )
    .bind(request_id)
    .fetch_optional(conn)
    .await?;

    Ok(request)
}

pub async fn get_pending_chat_request(
    conn: &mut PgConnection,
    sender_id: Uuid,
    receiver_id: Uuid,
) -> ChatRequestResult<Option<ChatRequest>> {
    let request = sqlx::query_as::<_, ChatRequest>(
        "SELECT id, sender_id, receiver_id, status, created_at, updated_at \
         FROM chat_requests \
         WHERE sender_id = $1 AND receiver_id = $2 AND status = 'pending'",
    )
    .bind(sender_id)
    .bind(receiver_id)
    .fetch_optional(conn)
    .await?;

    Ok(request)
}

/// Applies `status` only from `pending` or when the row already holds that
/// same status. Returns `None` when nothing matched.
pub async fn update_chat_request_status(
    conn: &mut PgConnection,
    request_id: Uuid,
    status: ChatRequestStatus,
) -> ChatRequestResult<Option<ChatRequest>> {
    let request = sqlx::query_as::<_, ChatRequest>(
        "UPDATE chat_requests SET status = $1, updated_at = now() \
         WHERE id = $2 AND (status = 'pending' OR status = $1) \
         RETURNING id, sender_id, receiver_id, status, created_at, updated_at",
    )
    .bind(status)
    .bind(request_id)
    .fetch_optional(conn)
    .await?;

    Ok(request)
}

pub async fn get_latest_chat_request_between(
    conn: &mut PgConnection,
    user_a: Uuid,
    user_b: Uuid,
) -> ChatRequestResult<Option<ChatRequest>> {
    let request = sqlx::query_as::<_, ChatRequest>(
        "SELECT id, sender_id, receiver_id, status, created_at, updated_at \
         FROM chat_requests \
         WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1) \
         ORDER BY created_at DESC, seq DESC \
         LIMIT 1",
    )
    .bind(user_a)
    .bind(user_b)
    .fetch_optional(conn)
    .await?;

    Ok(request)
}

pub async fn get_pending_chat_requests_for_receiver(
    conn: &mut PgConnection,
    receiver_id: Uuid,
) -> ChatRequestResult<Vec<ChatRequest>> {
    let requests = sqlx::query_as::<_, ChatRequest>(
        "SELECT id, sender_id, receiver_id, status, created_at, updated_at \
         FROM chat_requests \
         WHERE receiver_id = $1 AND status = 'pending' \
         ORDER BY created_at DESC, seq DESC",
    )
    .bind(receiver_id)
    .fetch_all(conn)
    .await?;

    Ok(requests)
}
