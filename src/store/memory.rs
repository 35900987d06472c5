use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::{
    error::{ChatRequestError, ChatRequestResult},
    models::chat_requests::{ChatRequest, ChatRequestStatus},
    store::ChatRequestStore,
};

#[derive(Debug, Clone)]
struct StoredRequest {
    // insertion order, breaks created_at ties
    seq: u64,
    request: ChatRequest,
}

/// In-process store. The entry for an ordered pair in `pending` is locked
/// across check-then-insert and across transitions out of `pending`, so it
/// serializes everything that can create or clear a pending row for that
/// pair. Lock order is always `pending` then `requests`.
#[derive(Clone, Default)]
pub struct MemoryChatRequestStore {
    // request_id -> row
    requests: Arc<DashMap<Uuid, StoredRequest>>,
    // (sender_id, receiver_id) -> id of the pending row
    pending: Arc<DashMap<(Uuid, Uuid), Uuid>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryChatRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[async_trait::async_trait]
impl ChatRequestStore for MemoryChatRequestStore {
    async fn insert_pending(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> ChatRequestResult<ChatRequest> {
        match self.pending.entry((sender_id, receiver_id)) {
            Entry::Occupied(_) => Err(ChatRequestError::DuplicatePending),
            Entry::Vacant(slot) => {
                let request = ChatRequest::new_pending(sender_id, receiver_id);
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                self.requests.insert(
                    request.id,
                    StoredRequest {
                        seq,
                        request: request.clone(),
                    },
                );
                slot.insert(request.id);
                Ok(request)
            }
        }
    }

    async fn find_by_id(&self, request_id: Uuid) -> ChatRequestResult<Option<ChatRequest>> {
        Ok(self
            .requests
            .get(&request_id)
            .map(|stored| stored.request.clone()))
    }

    async fn find_pending(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> ChatRequestResult<Option<ChatRequest>> {
        let Some(request_id) = self.pending.get(&(sender_id, receiver_id)).map(|id| *id) else {
            return Ok(None);
        };
        self.find_by_id(request_id).await
    }

    async fn update_status(
        &self,
        request_id: Uuid,
        status: ChatRequestStatus,
    ) -> ChatRequestResult<ChatRequest> {
        let pair = self
            .requests
            .get(&request_id)
            .map(|stored| (stored.request.sender_id, stored.request.receiver_id))
            .ok_or(ChatRequestError::NotFound)?;

        let slot = self.pending.entry(pair);

        let updated = {
            let mut stored = self
                .requests
                .get_mut(&request_id)
                .ok_or(ChatRequestError::NotFound)?;
            let current = stored.request.status;
            if current.is_terminal() && current != status {
                return Err(ChatRequestError::AlreadyResolved(current));
            }
            stored.request.status = status;
            stored.request.updated_at = Utc::now();
            stored.request.clone()
        };

        if let Entry::Occupied(slot) = slot {
            if *slot.get() == request_id && status.is_terminal() {
                slot.remove();
            }
        }

        Ok(updated)
    }

    async fn latest_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> ChatRequestResult<Option<ChatRequest>> {
        Ok(self
            .requests
            .iter()
            .filter(|stored| stored.request.involves(user_a, user_b))
            .max_by_key(|stored| (stored.request.created_at, stored.seq))
            .map(|stored| stored.request.clone()))
    }

    async fn list_pending_for_receiver(
        &self,
        receiver_id: Uuid,
    ) -> ChatRequestResult<Vec<ChatRequest>> {
        let mut rows: Vec<StoredRequest> = self
            .requests
            .iter()
            .filter(|stored| {
                stored.request.receiver_id == receiver_id
                    && stored.request.status == ChatRequestStatus::Pending
            })
            .map(|stored| stored.value().clone())
            .collect();

        rows.sort_by(|a, b| {
            (b.request.created_at, b.seq).cmp(&(a.request.created_at, a.seq))
        });

        Ok(rows.into_iter().map(|stored| stored.request).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_pending_rejects_duplicate_for_same_direction() {
        let store = MemoryChatRequestStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.insert_pending(a, b).await.unwrap();
        let second = store.insert_pending(a, b).await;

        assert!(matches!(second, Err(ChatRequestError::DuplicatePending)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_opposite_direction_is_a_different_pair() {
        let store = MemoryChatRequestStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.insert_pending(a, b).await.unwrap();
        store.insert_pending(b, a).await.unwrap();

        assert_eq!(store.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_leave_one_pending_row() {
        let store = MemoryChatRequestStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert_pending(a, b).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(ChatRequestError::DuplicatePending) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 31);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_clears_pending_slot() {
        let store = MemoryChatRequestStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let request = store.insert_pending(a, b).await.unwrap();
        let rejected = store
            .update_status(request.id, ChatRequestStatus::Rejected)
            .await
            .unwrap();

        assert_eq!(rejected.status, ChatRequestStatus::Rejected);
        assert!(rejected.updated_at >= request.updated_at);
        assert!(store.find_pending(a, b).await.unwrap().is_none());
        store.insert_pending(a, b).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_update_status_unknown_id() {
        let store = MemoryChatRequestStore::new();
        let result = store
            .update_status(Uuid::new_v4(), ChatRequestStatus::Accepted)
            .await;

        assert!(matches!(result, Err(ChatRequestError::NotFound)));
    }

    #[tokio::test]
    async fn test_terminal_status_cannot_flip() {
        let store = MemoryChatRequestStore::new();
        let request = store
            .insert_pending(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        store
            .update_status(request.id, ChatRequestStatus::Accepted)
            .await
            .unwrap();
        let again = store
            .update_status(request.id, ChatRequestStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(again.status, ChatRequestStatus::Accepted);

        let flipped = store
            .update_status(request.id, ChatRequestStatus::Rejected)
            .await;
        assert!(matches!(
            flipped,
            Err(ChatRequestError::AlreadyResolved(ChatRequestStatus::Accepted))
        ));
    }

    #[tokio::test]
    async fn test_latest_between_prefers_newest_row() {
        let store = MemoryChatRequestStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = store.insert_pending(a, b).await.unwrap();
        store
            .update_status(first.id, ChatRequestStatus::Rejected)
            .await
            .unwrap();
        let second = store.insert_pending(b, a).await.unwrap();

        let latest_ab = store.latest_between(a, b).await.unwrap().unwrap();
        let latest_ba = store.latest_between(b, a).await.unwrap().unwrap();
        assert_eq!(latest_ab.id, second.id);
        assert_eq!(latest_ba.id, second.id);
        assert!(store
            .latest_between(a, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_pending_for_receiver_newest_first() {
        let store = MemoryChatRequestStore::new();
        let receiver = Uuid::new_v4();

        let older = store.insert_pending(Uuid::new_v4(), receiver).await.unwrap();
        let newer = store.insert_pending(Uuid::new_v4(), receiver).await.unwrap();
        let resolved = store.insert_pending(Uuid::new_v4(), receiver).await.unwrap();
        store
            .update_status(resolved.id, ChatRequestStatus::Accepted)
            .await
            .unwrap();
        store.insert_pending(receiver, Uuid::new_v4()).await.unwrap();

        let inbox = store.list_pending_for_receiver(receiver).await.unwrap();
        let ids: Vec<Uuid> = inbox.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
