use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::models::websocket::{ConnectionHandle, ConnectionId, ServerEvent};

#[derive(Default)]
struct PresenceMaps {
    // user_id -> live connections of that user
    users: BTreeMap<Uuid, HashMap<ConnectionId, ConnectionHandle>>,
    // connection_id -> owning user_id
    owners: HashMap<ConnectionId, Uuid>,
}

impl PresenceMaps {
    fn detach(&mut self, connection_id: ConnectionId) -> Option<Uuid> {
        let user_id = self.owners.remove(&connection_id)?;
        if let Some(connections) = self.users.get_mut(&user_id) {
            connections.remove(&connection_id);
            if connections.is_empty() {
                self.users.remove(&user_id);
            }
        }
        Some(user_id)
    }

    /// Push the reachable-user list to every live connection. Runs under the
    /// registry lock so clients see snapshots in mutation order; `emit` only
    /// queues onto an unbounded channel and never waits.
    fn broadcast_online_users(&self) {
        let online: Vec<Uuid> = self.users.keys().copied().collect();
        let event = ServerEvent::GetOnlineUsers(online);

        for connection in self.users.values().flat_map(|c| c.values()) {
            if !connection.emit(event.clone()) {
                tracing::debug!(
                    connection_id = %connection.connection_id,
                    "presence broadcast skipped closed connection"
                );
            }
        }
    }
}

/// Maps a user to the set of sockets currently open for them. Owned by
/// `AppState` and shared by every connection task.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<Mutex<PresenceMaps>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PresenceMaps> {
        // Every mutation leaves the maps consistent, so a poisoned lock is
        // still safe to use.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `connection` under `user_id` and broadcast the online list.
    /// Registering the same handle twice is a no-op apart from the broadcast.
    pub fn connect(&self, user_id: Uuid, connection: ConnectionHandle) {
        let mut maps = self.lock();
        let connection_id = connection.connection_id;

        if maps.owners.get(&connection_id) != Some(&user_id) {
            // A handle belongs to exactly one user.
            maps.detach(connection_id);
            maps.owners.insert(connection_id, user_id);
        }
        maps.users
            .entry(user_id)
            .or_default()
            .insert(connection_id, connection);

        let live = maps.users.get(&user_id).map_or(0, HashMap::len);
        tracing::info!(%user_id, %connection_id, live, "user connected");

        maps.broadcast_online_users();
    }

    /// Remove `connection_id` from whichever user holds it and broadcast the
    /// online list. Returns the owning user, if the handle was registered.
    pub fn disconnect(&self, connection_id: ConnectionId) -> Option<Uuid> {
        let mut maps = self.lock();
        let user_id = maps.detach(connection_id);

        match user_id {
            Some(user_id) => {
                let live = maps.users.get(&user_id).map_or(0, HashMap::len);
                tracing::info!(%user_id, %connection_id, live, "user disconnected");
            }
            None => {
                tracing::debug!(%connection_id, "disconnect for unknown connection");
            }
        }

        maps.broadcast_online_users();
        user_id
    }

    pub fn reachable_connections(&self, user_id: Uuid) -> Vec<ConnectionHandle> {
        self.lock()
            .users
            .get(&user_id)
            .map(|connections| connections.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_reachable(&self, user_id: Uuid) -> bool {
        self.lock().users.contains_key(&user_id)
    }

    /// Reachable users in ascending id order.
    pub fn online_users(&self) -> Vec<Uuid> {
        self.lock().users.keys().copied().collect()
    }

    pub fn connection_count(&self) -> usize {
        self.lock().owners.len()
    }

    /// Drop every registration. Writers end once their channel senders are
    /// gone.
    pub fn clear(&self) {
        let mut maps = self.lock();
        let dropped = maps.owners.len();
        maps.users.clear();
        maps.owners.clear();
        tracing::info!(dropped, "presence registry cleared");
    }
}
