use crate::handlers::v1::chat_requests;
use crate::{app_state::AppState, middlewares::auth::auth_middleware};
use axum::routing::{get, post, put};
use axum::{middleware, Router};

pub fn chat_requests_routes() -> Router<AppState> {
    // Protected routes that require authentication
    Router::new()
        .route(
            "/",
            post(chat_requests::send_chat_request).get(chat_requests::get_chat_requests),
        )
        .route(
            "/status/{user_id}",
            get(chat_requests::check_chat_request_status),
        )
        .route(
            "/{request_id}/accept",
            put(chat_requests::accept_chat_request),
        )
        .route(
            "/{request_id}/reject",
            put(chat_requests::reject_chat_request),
        )
        .layer(middleware::from_fn(auth_middleware))
}
