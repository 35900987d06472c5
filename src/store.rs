//! Durable record of chat requests.
//!
//! Every backend must refuse a second `pending` row for the same ordered
//! (sender, receiver) pair atomically, and must only move a row out of
//! `pending` (or re-apply the status it already holds).

pub mod memory;
pub mod postgres;

use uuid::Uuid;

use crate::{
    error::ChatRequestResult,
    models::chat_requests::{ChatRequest, ChatRequestStatus},
};

pub use memory::MemoryChatRequestStore;
pub use postgres::PgChatRequestStore;

#[async_trait::async_trait]
pub trait ChatRequestStore: Send + Sync {
    /// Create a pending request. Fails with `DuplicatePending` when one
    /// already exists for this ordered pair.
    async fn insert_pending(&self, sender_id: Uuid, receiver_id: Uuid)
        -> ChatRequestResult<ChatRequest>;

    async fn find_by_id(&self, request_id: Uuid) -> ChatRequestResult<Option<ChatRequest>>;

    async fn find_pending(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> ChatRequestResult<Option<ChatRequest>>;

    /// Set `status` and bump `updated_at`. Fails with `NotFound` for an
    /// unknown id and `AlreadyResolved` when the row holds a different
    /// terminal status.
    async fn update_status(
        &self,
        request_id: Uuid,
        status: ChatRequestStatus,
    ) -> ChatRequestResult<ChatRequest>;

    /// Most recently created row for the unordered pair {user_a, user_b}.
    async fn latest_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> ChatRequestResult<Option<ChatRequest>>;

    /// Pending rows addressed to `receiver_id`, newest first.
    async fn list_pending_for_receiver(
        &self,
        receiver_id: Uuid,
    ) -> ChatRequestResult<Vec<ChatRequest>>;
}
