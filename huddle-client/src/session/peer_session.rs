use std::sync::Arc;

use huddle_core::{ConnectionId, IceServerConfig, Signal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::{
    ClientEvent, EngineEvent, EngineFactory, LocalTrackOf, NegotiationEngine, RemoteTrackOf,
    SessionState, SessionViews, SignalSink,
};

pub(super) struct SessionContext<F: EngineFactory> {
    pub(super) factory: Arc<F>,
    pub(super) sink: SignalSink,
    pub(super) events: mpsc::UnboundedSender<ClientEvent<RemoteTrackOf<F>>>,
    pub(super) views: SessionViews<RemoteTrackOf<F>>,
}

#[derive(Debug)]
pub(super) enum SessionInput {
    /// Begin negotiation as the offering side.
    StartOffer,
    Remote(Signal),
}

/// The manager's grip on a running session task.
pub(super) struct SessionHandle {
    input_tx: mpsc::UnboundedSender<SessionInput>,
    close_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub(super) fn spawn<F: EngineFactory>(
        peer: ConnectionId,
        context: Arc<SessionContext<F>>,
        local_tracks: Vec<LocalTrackOf<F>>,
        ice_servers: Vec<IceServerConfig>,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = watch::channel(false);

        let session = PeerSession {
            peer,
            state: SessionState::New,
            offer_pending: false,
            context,
        };
        let task = tokio::spawn(session.run(input_rx, close_rx, local_tracks, ice_servers));

        Self {
            input_tx,
            close_tx,
            task,
        }
    }

    pub(super) fn send(&self, input: SessionInput) {
        if self.input_tx.send(input).is_err() {
            warn!("Session task is gone, input dropped");
        }
    }

    /// Aborts any in-flight step and waits for the engine to be closed.
    pub(super) async fn close(self) {
        let _ = self.close_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Session task failed: {}", e);
        }
    }
}

/// Resolves once the session is told to close or the manager is gone.
async fn closed(close_rx: &mut watch::Receiver<bool>) {
    let _ = close_rx.wait_for(|closed| *closed).await;
}

pub(super) struct PeerSession<F: EngineFactory> {
    pub(super) peer: ConnectionId,
    pub(super) state: SessionState,
    /// A local offer is out and its answer has not been applied yet.
    pub(super) offer_pending: bool,
    pub(super) context: Arc<SessionContext<F>>,
}

impl<F: EngineFactory> PeerSession<F> {
    async fn run(
        mut self,
        mut input_rx: mpsc::UnboundedReceiver<SessionInput>,
        mut close_rx: watch::Receiver<bool>,
        local_tracks: Vec<LocalTrackOf<F>>,
        ice_servers: Vec<IceServerConfig>,
    ) {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        let created = tokio::select! {
            biased;
            _ = closed(&mut close_rx) => return,
            created = self.context.factory.create(self.peer, &ice_servers, event_tx) => created,
        };
        let engine = match created {
            Ok(engine) => engine,
            Err(e) => {
                error!("Failed to create engine for {}: {}", self.peer, e);
                closed(&mut close_rx).await;
                return;
            }
        };

        let mut closing = false;
        for track in local_tracks {
            tokio::select! {
                biased;
                _ = closed(&mut close_rx) => {
                    closing = true;
                    break;
                }
                result = engine.add_track(track) => {
                    if let Err(e) = result {
                        warn!("Failed to attach local track for {}: {}", self.peer, e);
                    }
                }
            }
        }

        if !closing {
            self.serve(&engine, &mut input_rx, &mut event_rx, &mut close_rx)
                .await;
        }

        if let Err(e) = engine.close().await {
            warn!("Failed to close engine for {}: {}", self.peer, e);
        }
        debug!("Session with {} closed", self.peer);
    }

    async fn serve(
        &mut self,
        engine: &F::Engine,
        input_rx: &mut mpsc::UnboundedReceiver<SessionInput>,
        event_rx: &mut mpsc::UnboundedReceiver<EngineEvent<RemoteTrackOf<F>>>,
        close_rx: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = closed(close_rx) => break,
                input = input_rx.recv() => {
                    let Some(input) = input else { break };
                    tokio::select! {
                        biased;
                        _ = closed(close_rx) => break,
                        _ = self.apply(engine, input) => {}
                    }
                }
                Some(event) = event_rx.recv() => self.on_engine_event(event),
            }
        }
    }

    async fn apply(&mut self, engine: &F::Engine, input: SessionInput) {
        let result = match input {
            SessionInput::StartOffer => self.send_offer(engine).await,
            SessionInput::Remote(Signal::Offer { sdp }) => {
                self.handle_remote_offer(engine, sdp).await
            }
            SessionInput::Remote(Signal::Answer { sdp }) => {
                self.handle_remote_answer(engine, sdp).await
            }
            SessionInput::Remote(Signal::Candidate(candidate)) => {
                self.handle_remote_candidate(engine, candidate).await
            }
        };

        if let Err(e) = result {
            error!("Negotiation with {} failed: {}", self.peer, e);
        }
    }

    pub(super) fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        self.state = state;
        if let Some(mut view) = self.context.views.get_mut(&self.peer) {
            view.state = state;
        }
        let _ = self.context.events.send(ClientEvent::SessionStateChanged {
            peer: self.peer,
            state,
        });
    }
}
