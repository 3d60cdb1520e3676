use async_trait::async_trait;
use huddle_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

use crate::EngineError;

mod webrtc_engine;

pub use webrtc_engine::*;

/// Transport-level connectivity of a single peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Callbacks raised by an engine, delivered to the owning session in order.
#[derive(Debug, Clone)]
pub enum EngineEvent<R> {
    /// A local candidate was gathered. `None` marks the end of gathering.
    LocalCandidate(Option<IceCandidate>),
    TrackReceived(R),
    LinkStateChanged(LinkState),
}

/// One peer-to-peer media connection.
///
/// Implementations must accept remote candidates before a remote
/// description is applied, buffering them internally if needed.
#[async_trait]
pub trait NegotiationEngine: Send + Sync + 'static {
    type LocalTrack: Clone + Send + Sync + 'static;
    type RemoteTrack: Clone + Send + Sync + 'static;

    async fn create_offer(&self) -> Result<SessionDescription, EngineError>;

    async fn create_answer(&self) -> Result<SessionDescription, EngineError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), EngineError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), EngineError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError>;

    async fn add_track(&self, track: Self::LocalTrack) -> Result<(), EngineError>;

    async fn close(&self) -> Result<(), EngineError>;
}

/// Builds a fresh engine for each remote peer.
#[async_trait]
pub trait EngineFactory: Send + Sync + 'static {
    type Engine: NegotiationEngine;

    async fn create(
        &self,
        peer: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<EngineEvent<<Self::Engine as NegotiationEngine>::RemoteTrack>>,
    ) -> Result<Self::Engine, EngineError>;
}

pub type LocalTrackOf<F> = <<F as EngineFactory>::Engine as NegotiationEngine>::LocalTrack;
pub type RemoteTrackOf<F> = <<F as EngineFactory>::Engine as NegotiationEngine>::RemoteTrack;
