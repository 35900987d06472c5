use crate::{
    app_state::AppState, middlewares::auth::auth_middleware,
    websocket::handlers::websocket_handler,
};
use axum::{middleware, routing::get, Router};

pub fn websocket_routes() -> Router<AppState> {
    // Upgrades only for callers with a session; presence is keyed by that user.
    Router::new()
        .route("/ws", get(websocket_handler))
        .layer(middleware::from_fn(auth_middleware))
}
