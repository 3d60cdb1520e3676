mod connection;
mod room;
mod signal;
mod signaling;

pub use connection::ConnectionId;
pub use room::RoomName;
pub use signal::{IceCandidate, SdpKind, SessionDescription, Signal, SignalError};
pub use signaling::{ClientMessage, IceServerConfig, ServerMessage};
