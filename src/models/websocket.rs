use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::chat_requests::{ChatRequestEvent, ChatRequestStatus};

pub type ConnectionId = Uuid;

/// Frame pushed to a client: `{"event": <name>, "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "newChatRequest")]
    NewChatRequest(ChatRequestCreated),
    #[serde(rename = "chatRequestAccepted")]
    ChatRequestAccepted(ChatRequestResolved),
    #[serde(rename = "chatRequestRejected")]
    ChatRequestRejected(ChatRequestResolved),
    #[serde(rename = "getOnlineUsers")]
    GetOnlineUsers(Vec<Uuid>),
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "pong")]
    Pong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestCreated {
    pub request_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: ChatRequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestResolved {
    pub request_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: ChatRequestStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<&ChatRequestEvent> for ServerEvent {
    fn from(event: &ChatRequestEvent) -> Self {
        let request = event.request();
        let resolved = || ChatRequestResolved {
            request_id: request.id,
            sender_id: request.sender_id,
            receiver_id: request.receiver_id,
            status: request.status,
            updated_at: request.updated_at,
        };

        match event {
            ChatRequestEvent::Created(_) => ServerEvent::NewChatRequest(ChatRequestCreated {
                request_id: request.id,
                sender_id: request.sender_id,
                receiver_id: request.receiver_id,
                status: request.status,
                created_at: request.created_at,
            }),
            ChatRequestEvent::Accepted(_) => ServerEvent::ChatRequestAccepted(resolved()),
            ChatRequestEvent::Rejected(_) => ServerEvent::ChatRequestRejected(resolved()),
        }
    }
}

/// One live socket. A user may hold several at once (tabs, devices).
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub connection_id: ConnectionId,
    pub sender: tokio::sync::mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(sender: tokio::sync::mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            sender,
        }
    }

    /// Queue an event for this socket's writer task. Never blocks; returns
    /// false when the writer is gone.
    pub fn emit(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}
