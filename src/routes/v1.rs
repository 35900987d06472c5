pub mod chat_requests;
pub mod websocket;
use crate::app_state::AppState;
use axum::Router;

pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/chat-requests", chat_requests::chat_requests_routes())
        .merge(websocket::websocket_routes())
}
