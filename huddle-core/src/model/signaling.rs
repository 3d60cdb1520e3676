use crate::model::connection::ConnectionId;
use crate::model::room::RoomName;
use crate::model::signal::{Signal, SignalError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Frames a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Announce membership of a room.
    JoinRoom { room: RoomName, username: String },

    /// Ask the relay to forward `signal` to a single connection.
    /// The payload is carried verbatim and never inspected by the relay.
    Signal { to: ConnectionId, signal: Value },
}

impl ClientMessage {
    pub fn join(room: impl Into<RoomName>, username: impl Into<String>) -> Self {
        Self::JoinRoom {
            room: room.into(),
            username: username.into(),
        }
    }

    pub fn signal(to: ConnectionId, signal: &Signal) -> Result<Self, SignalError> {
        Ok(Self::Signal {
            to,
            signal: signal.to_value()?,
        })
    }
}

/// Frames the relay pushes to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// First frame on every connection: the id the relay assigned.
    Welcome { id: ConnectionId },

    IceConfig { ice_servers: Vec<IceServerConfig> },

    /// Another connection joined a room this client is in.
    PeerJoined { id: ConnectionId, username: String },

    /// A relayed payload, tagged with the sender.
    Signal { from: ConnectionId, signal: Value },

    /// A room member disconnected.
    PeerLeft { id: ConnectionId },
}
