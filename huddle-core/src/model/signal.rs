//! Typed view of the `signal` payload peers exchange through the relay.
//!
//! On the wire a description carries a `type` tag (`offer`/`answer`) while a
//! network candidate carries none, so decoding goes through [`RawSignal`] and
//! is resolved once, here. Everything past this module matches on [`Signal`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("malformed signal payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported description type `{0}`")]
    UnsupportedType(String),

    #[error("{0:?} description without sdp")]
    MissingSdp(SdpKind),

    #[error("signal carries neither a description type nor a candidate")]
    UnknownShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// A network reachability option, in the browser's `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate(IceCandidate),
}

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignal {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    candidate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default, skip_serializing_if = "Option::is_none")]
    sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username_fragment: Option<String>,
}

impl TryFrom<RawSignal> for Signal {
    type Error = SignalError;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("offer") => raw
                .sdp
                .map(|sdp| Signal::Offer { sdp })
                .ok_or(SignalError::MissingSdp(SdpKind::Offer)),
            Some("answer") => raw
                .sdp
                .map(|sdp| Signal::Answer { sdp })
                .ok_or(SignalError::MissingSdp(SdpKind::Answer)),
            Some(other) => Err(SignalError::UnsupportedType(other.to_owned())),
            None => match raw.candidate {
                Some(candidate) => Ok(Signal::Candidate(IceCandidate {
                    candidate,
                    sdp_mid: raw.sdp_mid,
                    sdp_m_line_index: raw.sdp_m_line_index,
                    username_fragment: raw.username_fragment,
                })),
                None => Err(SignalError::UnknownShape),
            },
        }
    }
}

impl From<&Signal> for RawSignal {
    fn from(signal: &Signal) -> Self {
        match signal {
            Signal::Offer { sdp } => RawSignal {
                kind: Some("offer".to_owned()),
                sdp: Some(sdp.clone()),
                ..Default::default()
            },
            Signal::Answer { sdp } => RawSignal {
                kind: Some("answer".to_owned()),
                sdp: Some(sdp.clone()),
                ..Default::default()
            },
            Signal::Candidate(c) => RawSignal {
                candidate: Some(c.candidate.clone()),
                sdp_mid: c.sdp_mid.clone(),
                sdp_m_line_index: c.sdp_m_line_index,
                username_fragment: c.username_fragment.clone(),
                ..Default::default()
            },
        }
    }
}

impl From<SessionDescription> for Signal {
    fn from(desc: SessionDescription) -> Self {
        match desc.kind {
            SdpKind::Offer => Signal::Offer { sdp: desc.sdp },
            SdpKind::Answer => Signal::Answer { sdp: desc.sdp },
        }
    }
}

impl Signal {
    pub fn from_value(value: Value) -> Result<Self, SignalError> {
        let raw: RawSignal = serde_json::from_value(value)?;
        Signal::try_from(raw)
    }

    pub fn to_value(&self) -> Result<Value, SignalError> {
        Ok(serde_json::to_value(RawSignal::from(self))?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Offer { .. } => "offer",
            Signal::Answer { .. } => "answer",
            Signal::Candidate(_) => "candidate",
        }
    }
}
