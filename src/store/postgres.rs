use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{ChatRequestError, ChatRequestResult},
    models::chat_requests::{ChatRequest, ChatRequestStatus},
    queries::chat_requests::{
        get_chat_request_by_id, get_latest_chat_request_between, get_pending_chat_request,
        get_pending_chat_requests_for_receiver, insert_chat_request, update_chat_request_status,
    },
    store::ChatRequestStore,
};

/// Postgres-backed store. The partial unique index
/// `chat_requests_one_pending_per_pair` enforces one pending row per
/// ordered pair.
#[derive(Clone)]
pub struct PgChatRequestStore {
    pool: PgPool,
}

impl PgChatRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatRequestStore for PgChatRequestStore {
    async fn insert_pending(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> ChatRequestResult<ChatRequest> {
        let mut conn = self.pool.acquire().await?;
        let request = ChatRequest::new_pending(sender_id, receiver_id);
        insert_chat_request(&mut conn, &request).await
    }

    async fn find_by_id(&self, request_id: Uuid) -> ChatRequestResult<Option<ChatRequest>> {
        let mut conn = self.pool.acquire().await?;
        get_chat_request_by_id(&mut conn, request_id).await
    }

    async fn find_pending(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> ChatRequestResult<Option<ChatRequest>> {
        let mut conn = self.pool.acquire().await?;
        get_pending_chat_request(&mut conn, sender_id, receiver_id).await
    }

    async fn update_status(
        &self,
        request_id: Uuid,
        status: ChatRequestStatus,
    ) -> ChatRequestResult<ChatRequest> {
        let mut conn = self.pool.acquire().await?;

        if let Some(request) = update_chat_request_status(&mut conn, request_id, status).await? {
            return Ok(request);
        }

        // Nothing matched: either the row is gone or it holds the other
        // terminal status.
        match get_chat_request_by_id(&mut conn, request_id).await? {
            Some(request) => Err(ChatRequestError::AlreadyResolved(request.status)),
            None => Err(ChatRequestError::NotFound),
        }
    }

    async fn latest_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> ChatRequestResult<Option<ChatRequest>> {
        let mut conn = self.pool.acquire().await?;
        get_latest_chat_request_between(&mut conn, user_a, user_b).await
    }

    async fn list_pending_for_receiver(
        &self,
        receiver_id: Uuid,
    ) -> ChatRequestResult<Vec<ChatRequest>> {
        let mut conn = self.pool.acquire().await?;
        get_pending_chat_requests_for_receiver(&mut conn, receiver_id).await
    }
}
