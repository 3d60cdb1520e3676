use huddle_core::ConnectionId;
use tokio::sync::oneshot;

/// Commands a room's event loop processes, strictly in arrival order.
#[derive(Debug)]
pub enum RoomCommand {
    /// Add a member and announce it to everyone already present.
    Join {
        connection_id: ConnectionId,
        username: String,
    },

    /// Remove a member and announce the departure to the rest.
    Leave { connection_id: ConnectionId },

    /// Snapshot of the current member ids.
    Members {
        reply: oneshot::Sender<Vec<ConnectionId>>,
    },
}
