use huddle_core::{ConnectionId, ServerMessage, Signal};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::session::peer_session::SessionInput;
use crate::{ClientEvent, EngineFactory, PeerSessionManager};

impl<F: EngineFactory> PeerSessionManager<F> {
    pub async fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { id } => {
                info!("Relay assigned id {}", id);
                self.local_id = Some(id);
                self.emit(ClientEvent::Welcome { id });
            }

            ServerMessage::IceConfig { ice_servers } => {
                info!("Received ICE config: {} servers", ice_servers.len());
                self.ice_servers = ice_servers;
            }

            ServerMessage::PeerJoined { id, username } => self.on_peer_joined(id, username),

            ServerMessage::Signal { from, signal } => self.on_signal(from, signal),

            ServerMessage::PeerLeft { id } => self.on_peer_left(id).await,
        }
    }

    /// A newcomer joined one of our rooms: as the existing member, we offer.
    pub fn on_peer_joined(&mut self, peer: ConnectionId, username: String) {
        if self.departed.contains(&peer) {
            debug!("Ignoring join of departed peer {}", peer);
            return;
        }

        // A peer sharing two rooms with us is announced once per room.
        if self.sessions.contains_key(&peer) {
            debug!("Peer {} ({}) joined another room, session kept", peer, username);
            self.emit(ClientEvent::PeerJoined { id: peer, username });
            return;
        }

        info!("Peer {} ({}) joined, sending offer", peer, username);
        self.emit(ClientEvent::PeerJoined { id: peer, username });
        self.session(peer).send(SessionInput::StartOffer);
    }

    pub fn on_signal(&mut self, from: ConnectionId, payload: Value) {
        if self.departed.contains(&from) {
            debug!("Dropping signal from departed peer {}", from);
            return;
        }

        let signal = match Signal::from_value(payload) {
            Ok(signal) => signal,
            Err(e) => {
                warn!("Ignoring signal from {}: {}", from, e);
                return;
            }
        };

        if matches!(signal, Signal::Answer { .. }) && !self.sessions.contains_key(&from) {
            debug!("Ignoring answer from {} with no session", from);
            return;
        }

        debug!("Routing {} from {}", signal.kind(), from);
        self.session(from).send(SessionInput::Remote(signal));
    }

    /// Tears the session down; anything later from this peer is dropped.
    pub async fn on_peer_left(&mut self, peer: ConnectionId) {
        info!("Peer {} left", peer);
        self.remember_departed(peer);
        self.close_session(peer).await;
    }

    /// Closes every session, as on local disconnect.
    pub async fn close_all(&mut self) {
        let peers = self.peers();
        for peer in peers {
            self.close_session(peer).await;
        }
    }
}
