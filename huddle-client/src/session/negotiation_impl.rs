use huddle_core::{ClientMessage, IceCandidate, SessionDescription, Signal};
use tracing::{debug, info, warn};

use crate::session::peer_session::PeerSession;
use crate::{
    ClientError, ClientEvent, EngineEvent, EngineFactory, LinkState, NegotiationEngine,
    RemoteTrackOf, SessionState,
};

impl<F: EngineFactory> PeerSession<F> {
    fn relay(&self, signal: &Signal) -> Result<(), ClientError> {
        let msg = ClientMessage::signal(self.peer, signal)?;
        self.context
            .sink
            .send(msg)
            .map_err(|_| ClientError::ChannelClosed)
    }

    /// A renegotiation on a connected link keeps the session `Connected`.
    fn begin_negotiating(&mut self) {
        if self.state == SessionState::New {
            self.set_state(SessionState::Negotiating);
        }
    }

    pub(super) async fn send_offer(&mut self, engine: &F::Engine) -> Result<(), ClientError> {
        let offer = engine.create_offer().await?;
        engine.set_local_description(offer.clone()).await?;
        self.relay(&offer.into())?;
        self.offer_pending = true;

        debug!("Offer sent to {}", self.peer);
        self.begin_negotiating();
        Ok(())
    }

    /// Incoming offer: answer it. An offer on a live session renegotiates.
    pub(super) async fn handle_remote_offer(
        &mut self,
        engine: &F::Engine,
        sdp: String,
    ) -> Result<(), ClientError> {
        engine
            .set_remote_description(SessionDescription::offer(sdp))
            .await?;
        // Applying their offer rolls back any offer of ours.
        self.offer_pending = false;
        let answer = engine.create_answer().await?;
        engine.set_local_description(answer.clone()).await?;
        self.relay(&answer.into())?;

        debug!("Answer sent to {}", self.peer);
        self.begin_negotiating();
        Ok(())
    }

    pub(super) async fn handle_remote_answer(
        &mut self,
        engine: &F::Engine,
        sdp: String,
    ) -> Result<(), ClientError> {
        if !self.offer_pending {
            debug!(
                "Ignoring answer from {} with no offer outstanding ({:?})",
                self.peer, self.state
            );
            return Ok(());
        }

        engine
            .set_remote_description(SessionDescription::answer(sdp))
            .await?;
        self.offer_pending = false;
        debug!("Remote answer applied for {}", self.peer);
        Ok(())
    }

    pub(super) async fn handle_remote_candidate(
        &mut self,
        engine: &F::Engine,
        candidate: IceCandidate,
    ) -> Result<(), ClientError> {
        engine.add_ice_candidate(candidate).await?;
        Ok(())
    }

    pub(super) fn on_engine_event(&mut self, event: EngineEvent<RemoteTrackOf<F>>) {
        match event {
            EngineEvent::LocalCandidate(Some(candidate)) => {
                if let Err(e) = self.relay(&Signal::Candidate(candidate)) {
                    warn!("Failed to relay candidate to {}: {}", self.peer, e);
                }
            }

            EngineEvent::LocalCandidate(None) => {
                debug!("Candidate gathering finished for {}", self.peer);
            }

            EngineEvent::TrackReceived(track) => {
                info!("Remote track received from {}", self.peer);
                if let Some(mut view) = self.context.views.get_mut(&self.peer) {
                    view.remote_media.push(track.clone());
                }
                let _ = self.context.events.send(ClientEvent::RemoteTrack {
                    peer: self.peer,
                    track,
                });
            }

            EngineEvent::LinkStateChanged(LinkState::Connected) => {
                if self.state == SessionState::Negotiating {
                    self.set_state(SessionState::Connected);
                }
            }

            EngineEvent::LinkStateChanged(state @ (LinkState::Disconnected | LinkState::Failed)) => {
                warn!("Link to {} is {:?}", self.peer, state);
            }

            EngineEvent::LinkStateChanged(state) => {
                debug!("Link to {} is {:?}", self.peer, state);
            }
        }
    }
}
