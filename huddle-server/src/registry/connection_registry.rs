use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use dashmap::DashMap;
use huddle_core::{ConnectionId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Live connections and the outbound queue of each.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connect(&self, tx: mpsc::UnboundedSender<ServerMessage>) -> ConnectionId {
        let id = ConnectionId::new();
        self.connections.insert(id, tx);
        info!("Connection registered: {}", id);
        id
    }

    /// Returns `false` when the id was not (or no longer) registered.
    pub fn on_disconnect(&self, id: &ConnectionId) -> bool {
        let removed = self.connections.remove(id).is_some();
        if removed {
            info!("Connection unregistered: {}", id);
        }
        removed
    }

    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn send(&self, to: &ConnectionId, msg: ServerMessage) -> bool {
        let Some(tx) = self.connections.get(to) else {
            debug!("Dropping frame for unknown connection {}", to);
            return false;
        };
        if tx.send(msg).is_err() {
            debug!("Outbound queue of {} is closed, frame dropped", to);
            return false;
        }
        true
    }
}

#[async_trait]
impl SignalingOutput for ConnectionRegistry {
    async fn deliver(&self, to: &ConnectionId, msg: ServerMessage) -> bool {
        self.send(to, msg)
    }
}
