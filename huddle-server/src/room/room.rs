use crate::room::room_command::RoomCommand;
use crate::signaling::SignalingOutput;
use huddle_core::{ConnectionId, RoomName, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// One room's member set, owned by a single task so joins and leaves never
/// interleave.
pub struct Room {
    name: RoomName,
    members: HashMap<ConnectionId, String>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Room {
    pub fn new(
        name: RoomName,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            name,
            members: HashMap::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Room '{}' event loop started", self.name);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Room '{}' event loop finished", self.name);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                connection_id,
                username,
            } => {
                if self.members.contains_key(&connection_id) {
                    debug!(
                        "{} is already in room '{}', ignoring re-join",
                        connection_id, self.name
                    );
                    return;
                }

                info!(
                    "User {} ({}) joined room '{}'",
                    username, connection_id, self.name
                );

                let recipients: Vec<ConnectionId> = self.members.keys().copied().collect();
                for member in recipients {
                    let msg = ServerMessage::PeerJoined {
                        id: connection_id,
                        username: username.clone(),
                    };
                    self.signaling.deliver(&member, msg).await;
                }

                self.members.insert(connection_id, username);
            }

            RoomCommand::Leave { connection_id } => {
                if self.members.remove(&connection_id).is_none() {
                    return;
                }

                info!("{} left room '{}'", connection_id, self.name);

                let remaining: Vec<ConnectionId> = self.members.keys().copied().collect();
                for member in remaining {
                    let msg = ServerMessage::PeerLeft { id: connection_id };
                    self.signaling.deliver(&member, msg).await;
                }
            }

            RoomCommand::Members { reply } => {
                let _ = reply.send(self.members.keys().copied().collect());
            }
        }
    }
}
