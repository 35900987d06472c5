pub mod chat_requests;
pub mod sessions;
pub mod websocket;
