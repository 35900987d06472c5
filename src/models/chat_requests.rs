use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "chat_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ChatRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ChatRequestStatus::Pending)
    }
}

impl Display for ChatRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRequestStatus::Pending => write!(f, "pending"),
            ChatRequestStatus::Accepted => write!(f, "accepted"),
            ChatRequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/*
id UUID PRIMARY KEY,
sender_id UUID NOT NULL,
receiver_id UUID NOT NULL,
status chat_request_status NOT NULL DEFAULT 'pending',
created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: ChatRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatRequest {
    pub fn new_pending(sender_id: Uuid, receiver_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            status: ChatRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the row belongs to the unordered pair {a, b}.
    pub fn involves(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }
}

/// Relationship between two users as seen from either side. `None` when no
/// request has ever been exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    None,
    Pending,
    Accepted,
    Rejected,
}

impl From<ChatRequestStatus> for RelationshipStatus {
    fn from(status: ChatRequestStatus) -> Self {
        match status {
            ChatRequestStatus::Pending => RelationshipStatus::Pending,
            ChatRequestStatus::Accepted => RelationshipStatus::Accepted,
            ChatRequestStatus::Rejected => RelationshipStatus::Rejected,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipStatusResponse {
    pub status: RelationshipStatus,
}

/// State change emitted by the request state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequestEvent {
    Created(ChatRequest),
    Accepted(ChatRequest),
    Rejected(ChatRequest),
}

impl ChatRequestEvent {
    pub fn request(&self) -> &ChatRequest {
        match self {
            ChatRequestEvent::Created(request)
            | ChatRequestEvent::Accepted(request)
            | ChatRequestEvent::Rejected(request) => request,
        }
    }

    /// The user entitled to hear about this event: the receiver for a new
    /// request, the original sender for a response.
    pub fn target(&self) -> Uuid {
        match self {
            ChatRequestEvent::Created(request) => request.receiver_id,
            ChatRequestEvent::Accepted(request) | ChatRequestEvent::Rejected(request) => {
                request.sender_id
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatRequestEvent::Created(_) => "newChatRequest",
            ChatRequestEvent::Accepted(_) => "chatRequestAccepted",
            ChatRequestEvent::Rejected(_) => "chatRequestRejected",
        }
    }
}
