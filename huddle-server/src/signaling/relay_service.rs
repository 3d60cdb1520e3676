use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::registry::ConnectionRegistry;
use crate::room::RoomDirectory;
use crate::signaling::{RouteOutcome, SignalRouter, SignalingOutput};
use huddle_core::{ClientMessage, ConnectionId, IceServerConfig, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

struct RelayInner {
    registry: Arc<ConnectionRegistry>,
    directory: RoomDirectory,
    router: SignalRouter,
    ice_servers: Vec<IceServerConfig>,
}

/// Everything a connection handler needs, wired once at startup and shared
/// by every socket task.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new(config: &RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let output: Arc<dyn SignalingOutput> = registry.clone();
        let directory = RoomDirectory::new(output.clone(), config.room_channel_capacity);
        let router = SignalRouter::new(directory.clone(), output);

        Self {
            inner: Arc::new(RelayInner {
                registry,
                directory,
                router,
                ice_servers: config.ice_servers.clone(),
            }),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.inner.directory
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    /// Registers a connection and greets it with its id and the ICE servers.
    pub fn on_connect(&self, tx: mpsc::UnboundedSender<ServerMessage>) -> ConnectionId {
        let registry = &self.inner.registry;
        let id = registry.on_connect(tx);

        registry.send(&id, ServerMessage::Welcome { id });
        registry.send(
            &id,
            ServerMessage::IceConfig {
                ice_servers: self.get_ice_servers(),
            },
        );
        id
    }

    pub async fn handle_message(&self, from: ConnectionId, msg: ClientMessage) -> RouteOutcome {
        self.inner.router.route(from, msg).await
    }

    pub async fn handle_text(
        &self,
        from: ConnectionId,
        text: &str,
    ) -> Result<RouteOutcome, RelayError> {
        let msg: ClientMessage = serde_json::from_str(text)?;
        Ok(self.handle_message(from, msg).await)
    }

    /// Unregisters the connection and tells every room it was in. Safe to call
    /// more than once.
    pub async fn on_disconnect(&self, id: &ConnectionId) {
        if !self.inner.registry.on_disconnect(id) {
            debug!("Disconnect for unknown connection {}", id);
        }

        let rooms = self.inner.directory.leave(id).await;
        if rooms > 0 {
            info!("{} removed from {} room(s)", id, rooms);
        }
    }
}
