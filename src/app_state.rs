use std::sync::Arc;

use crate::{
    services::chat_requests::ChatRequestService,
    store::ChatRequestStore,
    websocket::{dispatcher::NotificationDispatcher, presence::PresenceRegistry},
};

#[derive(Clone)]
pub struct AppState {
    pub chat_requests: ChatRequestService,
    pub presence: PresenceRegistry,
}

impl AppState {
    /// Wires the state machine to a fresh presence registry through the
    /// notification dispatcher.
    pub fn new(store: Arc<dyn ChatRequestStore>) -> Self {
        let presence = PresenceRegistry::new();
        let dispatcher = Arc::new(NotificationDispatcher::new(presence.clone()));

        Self {
            chat_requests: ChatRequestService::new(store, dispatcher),
            presence,
        }
    }
}
