use std::future::Future;

use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ServerMessage};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::{
    ClientConfig, ClientError, ClientEvent, EngineFactory, PeerSessionManager, RemoteTrackOf,
};

/// A joined relay connection driving a [`PeerSessionManager`].
pub struct SignalingClient<F: EngineFactory> {
    manager: PeerSessionManager<F>,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
}

impl<F: EngineFactory> SignalingClient<F> {
    /// Connects and queues the `join-room` request.
    ///
    /// Empty room or username fail with [`ClientError::Usage`] before any
    /// network activity.
    pub async fn connect(
        config: ClientConfig,
        factory: F,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ClientEvent<RemoteTrackOf<F>>>), ClientError> {
        config.validate()?;

        let (stream, _) = connect_async(config.url.as_str()).await?;
        info!("Connected to relay at {}", config.url);

        let (sink, outbound_rx) = mpsc::unbounded_channel();
        sink.send(ClientMessage::join(config.room, config.username))
            .map_err(|_| ClientError::ChannelClosed)?;

        let (manager, events) = PeerSessionManager::new(factory, sink, config.ice_servers);

        let client = Self {
            manager,
            stream,
            outbound_rx,
        };
        Ok((client, events))
    }

    pub fn manager(&self) -> &PeerSessionManager<F> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut PeerSessionManager<F> {
        &mut self.manager
    }

    /// Runs until the relay goes away.
    pub async fn run(self) -> Result<(), ClientError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs until the relay goes away or `shutdown` resolves. Every session
    /// is closed on the way out.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<(), ClientError> {
        let Self {
            mut manager,
            stream,
            mut outbound_rx,
        } = self;
        let (mut write, mut read) = stream.split();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Leaving relay");
                    let _ = write.send(Message::Close(None)).await;
                    break Ok(());
                }

                Some(msg) = outbound_rx.recv() => {
                    let json = match serde_json::to_string(&msg) {
                        Ok(json) => json,
                        Err(e) => break Err(e.into()),
                    };
                    if let Err(e) = write.send(Message::Text(json.into())).await {
                        break Err(e.into());
                    }
                }

                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => manager.handle_server_message(msg).await,
                            Err(e) => warn!("Ignoring malformed frame from relay: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Relay closed the connection");
                        break Ok(());
                    }
                    Some(Ok(other)) => debug!("Ignoring non-text frame: {:?}", other),
                    Some(Err(e)) => break Err(e.into()),
                },
            }
        };

        manager.close_all().await;
        result
    }
}
