mod index;
mod v1;
use crate::app_state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_routes(cors_origin: HeaderValue) -> Router<AppState> {
    // Session cookies travel cross-origin, so the origin must be explicit.
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .merge(index::index_route())
        .nest("/api/v1", v1::v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
