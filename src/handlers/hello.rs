use axum::{extract::State, Json};
use serde::Serialize;

use crate::app_state::AppState;

pub async fn hello() -> &'static str {
    "chat requests backend is running"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceStats {
    pub online_users: usize,
    pub connections: usize,
}

pub async fn presence_stats(State(state): State<AppState>) -> Json<PresenceStats> {
    Json(PresenceStats {
        online_users: state.presence.online_users().len(),
        connections: state.presence.connection_count(),
    })
}
