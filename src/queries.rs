pub mod chat_requests;
