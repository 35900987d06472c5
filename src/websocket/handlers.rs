use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{
        sessions::VerifiedUser,
        websocket::{ConnectionHandle, ServerEvent},
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    user: VerifiedUser,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, state, user))
}

async fn handle_websocket(socket: WebSocket, state: AppState, user: VerifiedUser) {
    let user_id = user.user_id();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ServerEvent>();
    let connection = ConnectionHandle::new(tx);
    let connection_id = connection.connection_id;

    // Spawn task to handle outgoing events
    let outgoing_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(%connection_id, error = %e, "failed to encode event");
                }
            }
        }
    });

    state.presence.connect(user_id, connection.clone());

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = handle_text_message(&connection, text.as_str()) {
                    tracing::debug!(%user_id, %connection_id, error = %e, "rejected client frame");
                    connection.emit(ServerEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(%user_id, %connection_id, "client closed socket");
                break;
            }
            Err(e) => {
                tracing::warn!(%user_id, %connection_id, error = %e, "socket receive error");
                break;
            }
            _ => {}
        }
    }

    // cleanup when connection closes
    state.presence.disconnect(connection_id);
    outgoing_task.abort();
}

/// Clients only send keepalives. Chat-request events are produced by the
/// server from durable state changes, never relayed from a client.
fn handle_text_message(connection: &ConnectionHandle, text: &str) -> AppResult<()> {
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid JSON")))?;

    let message_type = parsed["type"].as_str().ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Missing or invalid 'type' field in message"
        ))
    })?;

    match message_type {
        "ping" => {
            connection.emit(ServerEvent::Pong);
            Ok(())
        }
        _ => Err(AppError::BadRequest(anyhow::anyhow!(
            "Unknown message type: {}",
            message_type
        ))),
    }
}
