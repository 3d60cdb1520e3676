use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;
use huddle_core::{ClientMessage, ConnectionId, IceServerConfig};
use tokio::sync::mpsc;

use crate::{EngineFactory, LocalTrackOf, RemoteTrackOf};

mod handle_signal_impl;
mod negotiation_impl;
mod peer_session;

use peer_session::{SessionContext, SessionHandle};

/// How many departed peer ids are remembered. Ids are random and never
/// reused, so forgetting the oldest only lets a very late stray signal in.
pub const DEPARTED_MEMORY: usize = 1024;

/// Outbound frames toward the relay.
pub type SignalSink = mpsc::UnboundedSender<ClientMessage>;

/// Live view of every session, readable from outside the manager.
pub type SessionViews<R> = Arc<DashMap<ConnectionId, SessionView<R>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no description exchanged yet.
    New,
    Negotiating,
    Connected,
    Closed,
}

/// What the presentation layer sees of one remote peer.
#[derive(Debug, Clone)]
pub struct SessionView<R> {
    pub state: SessionState,
    pub remote_media: Vec<R>,
}

impl<R> SessionView<R> {
    fn new() -> Self {
        Self {
            state: SessionState::New,
            remote_media: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent<R> {
    Welcome {
        id: ConnectionId,
    },
    PeerJoined {
        id: ConnectionId,
        username: String,
    },
    SessionStateChanged {
        peer: ConnectionId,
        state: SessionState,
    },
    RemoteTrack {
        peer: ConnectionId,
        track: R,
    },
    /// The session is gone and its media aggregate cleared.
    PeerClosed {
        peer: ConnectionId,
    },
}

/// Owns one negotiation session per remote peer.
///
/// Server messages are fed in order through [`handle_server_message`].
/// Each session runs on its own task, so a slow engine step for one
/// peer never holds up routing for another.
///
/// [`handle_server_message`]: PeerSessionManager::handle_server_message
pub struct PeerSessionManager<F: EngineFactory> {
    context: Arc<SessionContext<F>>,
    sessions: HashMap<ConnectionId, SessionHandle>,
    departed: HashSet<ConnectionId>,
    departed_order: VecDeque<ConnectionId>,
    local_tracks: Vec<LocalTrackOf<F>>,
    ice_servers: Vec<IceServerConfig>,
    local_id: Option<ConnectionId>,
}

impl<F: EngineFactory> PeerSessionManager<F> {
    pub fn new(
        factory: F,
        sink: SignalSink,
        ice_servers: Vec<IceServerConfig>,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent<RemoteTrackOf<F>>>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let context = Arc::new(SessionContext {
            factory: Arc::new(factory),
            sink,
            events: events_tx,
            views: Arc::new(DashMap::new()),
        });

        let manager = Self {
            context,
            sessions: HashMap::new(),
            departed: HashSet::new(),
            departed_order: VecDeque::new(),
            local_tracks: Vec::new(),
            ice_servers,
            local_id: None,
        };
        (manager, events_rx)
    }

    /// Tracks attached to every session created from now on.
    pub fn set_local_tracks(&mut self, tracks: Vec<LocalTrackOf<F>>) {
        self.local_tracks = tracks;
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn state(&self, peer: &ConnectionId) -> Option<SessionState> {
        self.context.views.get(peer).map(|view| view.state)
    }

    pub fn remote_tracks(&self, peer: &ConnectionId) -> Vec<RemoteTrackOf<F>> {
        self.context
            .views
            .get(peer)
            .map(|view| view.remote_media.clone())
            .unwrap_or_default()
    }

    pub fn peers(&self) -> Vec<ConnectionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn views(&self) -> SessionViews<RemoteTrackOf<F>> {
        self.context.views.clone()
    }

    fn emit(&self, event: ClientEvent<RemoteTrackOf<F>>) {
        let _ = self.context.events.send(event);
    }

    fn session(&mut self, peer: ConnectionId) -> &SessionHandle {
        let context = &self.context;
        let local_tracks = &self.local_tracks;
        let ice_servers = &self.ice_servers;
        self.sessions.entry(peer).or_insert_with(|| {
            context.views.insert(peer, SessionView::new());
            SessionHandle::spawn(
                peer,
                context.clone(),
                local_tracks.clone(),
                ice_servers.clone(),
            )
        })
    }

    fn remember_departed(&mut self, peer: ConnectionId) {
        if !self.departed.insert(peer) {
            return;
        }
        self.departed_order.push_back(peer);
        while self.departed_order.len() > DEPARTED_MEMORY {
            let Some(oldest) = self.departed_order.pop_front() else {
                break;
            };
            self.departed.remove(&oldest);
        }
    }

    async fn close_session(&mut self, peer: ConnectionId) {
        let Some(handle) = self.sessions.remove(&peer) else {
            return;
        };
        handle.close().await;
        self.context.views.remove(&peer);
        self.emit(ClientEvent::SessionStateChanged {
            peer,
            state: SessionState::Closed,
        });
        self.emit(ClientEvent::PeerClosed { peer });
    }
}
