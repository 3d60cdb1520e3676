use crate::room::RoomDirectory;
use crate::signaling::SignalingOutput;
use huddle_core::{ClientMessage, ConnectionId, ServerMessage};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Forwarded to the room directory, which broadcasts to the other members.
    Joined,
    /// Handed to the target's outbound queue.
    Delivered,
    /// Target not connected; nothing is reported back to the sender.
    Dropped,
}

/// Decides where an inbound frame goes. Holds no state of its own.
///
/// Signals are relayed to any connected id without checking that sender and
/// target share a room, and the payload is never inspected.
#[derive(Clone)]
pub struct SignalRouter {
    directory: RoomDirectory,
    output: Arc<dyn SignalingOutput>,
}

impl SignalRouter {
    pub fn new(directory: RoomDirectory, output: Arc<dyn SignalingOutput>) -> Self {
        Self { directory, output }
    }

    pub async fn route(&self, from: ConnectionId, msg: ClientMessage) -> RouteOutcome {
        match msg {
            ClientMessage::JoinRoom { room, username } => {
                info!("User {} ({}) wants to join room '{}'", username, from, room);
                self.directory.join(room, from, username).await;
                RouteOutcome::Joined
            }

            ClientMessage::Signal { to, signal } => {
                debug!("Signal from {} to {}: {}", from, to, signal);
                let msg = ServerMessage::Signal { from, signal };
                if self.output.deliver(&to, msg).await {
                    RouteOutcome::Delivered
                } else {
                    debug!("Signal target {} is not connected, dropped", to);
                    RouteOutcome::Dropped
                }
            }
        }
    }
}
