use huddle_core::SignalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("webrtc: {0}")]
    WebRtc(#[from] webrtc::Error),

    #[error("negotiation rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing room or username; detected before anything is sent.
    #[error("{0} is required")]
    Usage(&'static str),

    #[error("websocket: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    #[error("invalid signal: {0}")]
    Signal(#[from] SignalError),

    #[error("engine: {0}")]
    Engine(#[from] EngineError),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("signaling channel closed")]
    ChannelClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(e))
    }
}
