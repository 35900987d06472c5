use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{ChatRequestError, ChatRequestResult},
    models::{
        chat_requests::{ChatRequest, ChatRequestEvent, ChatRequestStatus, RelationshipStatus},
        sessions::VerifiedUser,
    },
    store::ChatRequestStore,
};

/// Receives state changes once they are durable. Implementations must not
/// block and must not fail the caller: delivery is best effort.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: ChatRequestEvent);
}

#[derive(Debug, Clone, Copy)]
enum Response {
    Accept,
    Reject,
}

impl Response {
    fn status(self) -> ChatRequestStatus {
        match self {
            Response::Accept => ChatRequestStatus::Accepted,
            Response::Reject => ChatRequestStatus::Rejected,
        }
    }

    fn event(self, request: ChatRequest) -> ChatRequestEvent {
        match self {
            Response::Accept => ChatRequestEvent::Accepted(request),
            Response::Reject => ChatRequestEvent::Rejected(request),
        }
    }
}

/// The chat-request state machine: pending -> accepted | rejected.
#[derive(Clone)]
pub struct ChatRequestService {
    store: Arc<dyn ChatRequestStore>,
    events: Arc<dyn EventSink>,
}

impl ChatRequestService {
    pub fn new(store: Arc<dyn ChatRequestStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// Propose a chat to `receiver_id`. Only one pending request may exist
    /// per direction; a rejected or accepted one does not block a new send.
    pub async fn send(
        &self,
        caller: &VerifiedUser,
        receiver_id: Uuid,
    ) -> ChatRequestResult<ChatRequest> {
        let sender_id = caller.user_id();
        if sender_id == receiver_id {
            return Err(ChatRequestError::SelfRequest);
        }

        if self
            .store
            .find_pending(sender_id, receiver_id)
            .await?
            .is_some()
        {
            return Err(ChatRequestError::DuplicatePending);
        }

        // The store's uniqueness guarantee covers a send racing past the
        // check above.
        let request = self.store.insert_pending(sender_id, receiver_id).await?;
        tracing::info!(
            request_id = %request.id,
            %sender_id,
            %receiver_id,
            "chat request sent"
        );

        self.events.publish(ChatRequestEvent::Created(request.clone()));
        Ok(request)
    }

    pub async fn accept(
        &self,
        caller: &VerifiedUser,
        request_id: Uuid,
    ) -> ChatRequestResult<ChatRequest> {
        self.respond(caller, request_id, Response::Accept).await
    }

    pub async fn reject(
        &self,
        caller: &VerifiedUser,
        request_id: Uuid,
    ) -> ChatRequestResult<ChatRequest> {
        self.respond(caller, request_id, Response::Reject).await
    }

    // Re-applying the status a row already holds succeeds and notifies the
    // sender again.
    async fn respond(
        &self,
        caller: &VerifiedUser,
        request_id: Uuid,
        response: Response,
    ) -> ChatRequestResult<ChatRequest> {
        let request = self
            .store
            .find_by_id(request_id)
            .await?
            .ok_or(ChatRequestError::NotFound)?;

        if request.receiver_id != caller.user_id() {
            return Err(ChatRequestError::NotReceiver);
        }

        let updated = self
            .store
            .update_status(request_id, response.status())
            .await?;
        tracing::info!(
            request_id = %updated.id,
            sender_id = %updated.sender_id,
            receiver_id = %updated.receiver_id,
            status = %updated.status,
            "chat request answered"
        );

        self.events.publish(response.event(updated.clone()));
        Ok(updated)
    }

    /// Status of the newest request exchanged between the caller and
    /// `other_user_id`, in either direction.
    pub async fn current_status(
        &self,
        caller: &VerifiedUser,
        other_user_id: Uuid,
    ) -> ChatRequestResult<RelationshipStatus> {
        let latest = self
            .store
            .latest_between(caller.user_id(), other_user_id)
            .await?;

        Ok(latest.map_or(RelationshipStatus::None, |request| request.status.into()))
    }

    /// Pending requests addressed to the caller, newest first. Clients call
    /// this on (re)connect to pick up notifications they missed.
    pub async fn list_pending_for_receiver(
        &self,
        caller: &VerifiedUser,
    ) -> ChatRequestResult<Vec<ChatRequest>> {
        self.store.list_pending_for_receiver(caller.user_id()).await
    }
}
