use uuid::Uuid;

use crate::{
    models::{chat_requests::ChatRequestEvent, websocket::ServerEvent},
    services::chat_requests::EventSink,
    websocket::presence::PresenceRegistry,
};

/// Pushes chat-request events to every live connection of the user they
/// concern. Unreachable users are skipped; they recover state by querying
/// on reconnect.
#[derive(Clone)]
pub struct NotificationDispatcher {
    presence: PresenceRegistry,
}

impl NotificationDispatcher {
    pub fn new(presence: PresenceRegistry) -> Self {
        Self { presence }
    }

    /// Queue `event` on each connection of `target_user_id`. Returns how many
    /// connections accepted it.
    pub fn notify(&self, target_user_id: Uuid, event: ServerEvent) -> usize {
        let connections = self.presence.reachable_connections(target_user_id);
        let mut delivered = 0;

        for connection in connections {
            if connection.emit(event.clone()) {
                delivered += 1;
            } else {
                // The socket task deregisters itself on close.
                tracing::warn!(
                    user_id = %target_user_id,
                    connection_id = %connection.connection_id,
                    "failed to push event to closed connection"
                );
            }
        }

        delivered
    }
}

impl EventSink for NotificationDispatcher {
    fn publish(&self, event: ChatRequestEvent) {
        let target = event.target();
        let delivered = self.notify(target, ServerEvent::from(&event));

        if delivered == 0 {
            tracing::debug!(
                user_id = %target,
                event = event.name(),
                request_id = %event.request().id,
                "target offline, notification dropped"
            );
        } else {
            tracing::debug!(
                user_id = %target,
                event = event.name(),
                delivered,
                "notification pushed"
            );
        }
    }
}
