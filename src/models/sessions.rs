use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const USER_SESSION_KEY: &str = "user";

/// Written into the session by the auth service after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: Uuid,
}

/// Caller identity that has already been checked against the session store.
/// Every chat-request operation takes one instead of a bare id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedUser {
    user_id: Uuid,
}

impl VerifiedUser {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

impl From<UserSession> for VerifiedUser {
    fn from(session: UserSession) -> Self {
        Self::new(session.user_id)
    }
}
