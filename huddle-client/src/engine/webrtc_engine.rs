use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::{ConnectionId, IceCandidate, IceServerConfig, SdpKind, SessionDescription};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::API;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
pub use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

use crate::{EngineError, EngineEvent, EngineFactory, LinkState, NegotiationEngine};

/// Creates `webrtc` peer connections sharing one media engine setup.
pub struct WebRtcEngineFactory {
    api: API,
    receive_kinds: Vec<RTPCodecType>,
}

impl WebRtcEngineFactory {
    pub fn new() -> Result<Self, EngineError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self {
            api,
            receive_kinds: Vec::new(),
        })
    }

    /// Adds a receive-only transceiver per kind to every new connection,
    /// so a peer without local media still asks for remote media.
    pub fn receive_only(mut self, kinds: &[RTPCodecType]) -> Self {
        self.receive_kinds = kinds.to_vec();
        self
    }
}

fn rtc_ice_servers(servers: &[IceServerConfig]) -> Vec<RTCIceServer> {
    servers
        .iter()
        .map(|server| RTCIceServer {
            urls: server.urls.clone(),
            username: server.username.clone().unwrap_or_default(),
            credential: server.credential.clone().unwrap_or_default(),
        })
        .collect()
}

impl From<RTCPeerConnectionState> for LinkState {
    fn from(state: RTCPeerConnectionState) -> Self {
        match state {
            RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => LinkState::New,
            RTCPeerConnectionState::Connecting => LinkState::Connecting,
            RTCPeerConnectionState::Connected => LinkState::Connected,
            RTCPeerConnectionState::Disconnected => LinkState::Disconnected,
            RTCPeerConnectionState::Failed => LinkState::Failed,
            RTCPeerConnectionState::Closed => LinkState::Closed,
        }
    }
}

#[async_trait]
impl EngineFactory for WebRtcEngineFactory {
    type Engine = WebRtcEngine;

    async fn create(
        &self,
        peer: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<EngineEvent<Arc<TrackRemote>>>,
    ) -> Result<WebRtcEngine, EngineError> {
        let rtc_config = RTCConfiguration {
            ice_servers: rtc_ice_servers(ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(self.api.new_peer_connection(rtc_config).await?);

        for kind in &self.receive_kinds {
            peer_connection
                .add_transceiver_from_kind(
                    *kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        send_encodings: vec![],
                    }),
                )
                .await?;
        }

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                info!("Peer connection state changed for {}: {}", peer, s);
                let _ = state_tx.send(EngineEvent::LinkStateChanged(s.into()));
                Box::pin(async {})
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let event = match c {
                Some(candidate) => match candidate.to_json() {
                    Ok(init) => Some(EngineEvent::LocalCandidate(Some(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                        username_fragment: init.username_fragment,
                    }))),
                    Err(e) => {
                        warn!("Failed to serialize local candidate for {}: {}", peer, e);
                        None
                    }
                },
                None => Some(EngineEvent::LocalCandidate(None)),
            };
            if let Some(event) = event {
                let _ = ice_tx.send(event);
            }
            Box::pin(async {})
        }));

        let track_tx = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                debug!("Remote {} track from {}", track.kind(), peer);
                let _ = track_tx.send(EngineEvent::TrackReceived(track));
                Box::pin(async {})
            },
        ));

        Ok(WebRtcEngine {
            peer,
            peer_connection,
            pending_candidates: Mutex::new(Vec::new()),
        })
    }
}

/// A single `RTCPeerConnection` toward one remote peer.
pub struct WebRtcEngine {
    peer: ConnectionId,
    peer_connection: Arc<RTCPeerConnection>,
    // Remote candidates that arrived before the remote description.
    pending_candidates: Mutex<Vec<RTCIceCandidateInit>>,
}

impl WebRtcEngine {
    pub fn peer(&self) -> ConnectionId {
        self.peer
    }

    pub fn peer_connection(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, EngineError> {
    let desc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(desc)
}

#[async_trait]
impl NegotiationEngine for WebRtcEngine {
    type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;
    type RemoteTrack = Arc<TrackRemote>;

    async fn create_offer(&self) -> Result<SessionDescription, EngineError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, EngineError> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        self.peer_connection
            .set_local_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), EngineError> {
        self.peer_connection
            .set_remote_description(to_rtc(desc)?)
            .await?;

        let pending = std::mem::take(&mut *self.pending_candidates.lock().await);
        if !pending.is_empty() {
            debug!(
                "Applying {} buffered candidates for {}",
                pending.len(),
                self.peer
            );
        }
        for candidate in pending {
            if let Err(e) = self.peer_connection.add_ice_candidate(candidate).await {
                warn!("Buffered candidate rejected for {}: {}", self.peer, e);
            }
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };

        if self.peer_connection.remote_description().await.is_none() {
            self.pending_candidates.lock().await.push(init);
            return Ok(());
        }

        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn add_track(&self, track: Self::LocalTrack) -> Result<(), EngineError> {
        self.peer_connection.add_track(track).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
