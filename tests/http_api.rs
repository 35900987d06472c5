//! HTTP surface, driven through the router with an in-memory session store.
//! `/test-login/{user_id}` stands in for the external auth service.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Path,
    http::{header, HeaderValue, Method, Request, StatusCode},
    routing::get,
    Router,
};
use chat_requests_backend::{
    app_state::AppState,
    models::sessions::{UserSession, USER_SESSION_KEY},
    routes,
    store::MemoryChatRequestStore,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

async fn test_login(session: Session, Path(user_id): Path<Uuid>) -> StatusCode {
    session
        .insert(USER_SESSION_KEY, UserSession { user_id })
        .await
        .unwrap();
    StatusCode::OK
}

fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryChatRequestStore::new()));
    routes::create_routes(HeaderValue::from_static("http://localhost:5173"))
        .route("/test-login/{user_id}", get(test_login))
        .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
        .with_state(state)
}

async fn login(app: &Router, user_id: Uuid) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/test-login/{user_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn liveness_route_is_public() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_request_routes_require_a_session() {
    let app = app();

    let (status, _) = call(&app, Method::GET, "/api/v1/chat-requests", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/chat-requests",
        None,
        Some(json!({ "receiverId": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn send_accept_and_query_status_over_http() {
    let app = app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let alice_cookie = login(&app, alice).await;
    let bob_cookie = login(&app, bob).await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/v1/chat-requests",
        Some(&alice_cookie),
        Some(json!({ "receiverId": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["senderId"], alice.to_string());
    assert_eq!(created["receiverId"], bob.to_string());
    let request_id = created["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/chat-requests",
        Some(&alice_cookie),
        Some(json!({ "receiverId": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].is_string());

    let (status, inbox) = call(
        &app,
        Method::GET,
        "/api/v1/chat-requests",
        Some(&bob_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["id"], request_id);

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/chat-requests/{request_id}/accept"),
        Some(&alice_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, accepted) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/chat-requests/{request_id}/accept"),
        Some(&bob_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    for (cookie, other) in [(&alice_cookie, bob), (&bob_cookie, alice)] {
        let (status, body) = call(
            &app,
            Method::GET,
            &format!("/api/v1/chat-requests/status/{other}"),
            Some(cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "accepted" }));
    }
}

#[tokio::test]
async fn status_without_history_is_none() {
    let app = app();
    let cookie = login(&app, Uuid::new_v4()).await;

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/chat-requests/status/{}", Uuid::new_v4()),
        Some(&cookie),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "none" }));
}

#[tokio::test]
async fn bad_ids_and_unknown_requests() {
    let app = app();
    let cookie = login(&app, Uuid::new_v4()).await;

    let (status, _) = call(
        &app,
        Method::PUT,
        "/api/v1/chat-requests/not-a-uuid/reject",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/chat-requests/{}/reject", Uuid::new_v4()),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/chat-requests",
        Some(&cookie),
        Some(json!({ "receiverId": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
