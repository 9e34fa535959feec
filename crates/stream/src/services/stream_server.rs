use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::actors::{Actor, ActorType, ControlMessage};

use crate::services::log_publisher::LogPublisher;

/// Serves the live-log endpoint: every accepted WebSocket connection becomes
/// an independent subscriber of the publisher. Each broadcast line is
/// forwarded as one text message; a closed or lagging connection is dropped
/// without touching the others.
pub struct StreamServer {
    id: Uuid,
    addr: String,
    listener: Option<TcpListener>,
    publisher: LogPublisher,
}

#[async_trait]
impl Actor for StreamServer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> ActorType {
        ActorType::StreamServerActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());

        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => match TcpListener::bind(&self.addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    heartbeat_handle.abort();
                    supervisor_tx
                        .send(ControlMessage::Error(
                            self.name(),
                            format!("Failed to bind {}: {}", self.addr, e),
                        ))
                        .await?;
                    bail!("Failed to bind {}: {}", self.addr, e);
                }
            },
        };

        info!("Log stream listening on {}", self.addr);

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    // Subscribe before the handshake so nothing emitted after
                    // accept is missed by this connection.
                    let rx = self.publisher.subscribe();
                    tokio::spawn(Self::serve_subscriber(stream, peer, rx));
                }
                Err(e) => {
                    heartbeat_handle.abort();
                    supervisor_tx
                        .send(ControlMessage::Error(
                            self.name(),
                            format!("Accept failed: {}", e),
                        ))
                        .await?;
                    bail!("Accept failed: {}", e);
                }
            }
        }
    }
}

impl StreamServer {
    pub fn new(addr: impl Into<String>, publisher: LogPublisher) -> Self {
        Self {
            id: Uuid::new_v4(),
            addr: addr.into(),
            listener: None,
            publisher,
        }
    }

    /// Binds up front and reports the bound address. Used when the caller
    /// needs the ephemeral port before the actor runs.
    pub async fn bind(
        addr: &str,
        publisher: LogPublisher,
    ) -> std::io::Result<(Self, SocketAddr)> {
        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        Ok((
            Self {
                id: Uuid::new_v4(),
                addr: local.to_string(),
                listener: Some(listener),
                publisher,
            },
            local,
        ))
    }

    async fn serve_subscriber(
        stream: TcpStream,
        peer: SocketAddr,
        mut rx: broadcast::Receiver<Arc<str>>,
    ) {
        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                debug!("Handshake with {} failed: {}", peer, e);
                return;
            }
        };
        info!("Subscriber {} connected", peer);

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Ok(line) => {
                        if write.send(Message::Text(line.as_ref().into())).await.is_err() {
                            debug!("Subscriber {} dropped", peer);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // A consumer this far behind is stalling; cut it loose
                        // rather than replaying.
                        warn!("Subscriber {} lagged by {} lines, closing", peer, n);
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                msg = read.next() => match msg {
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = write.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Subscriber {} closed", peer);
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("Subscriber {} error: {}", peer, e);
                        break;
                    }
                    Some(Ok(_)) => {}
                },
            }
        }

        let _ = write.close().await;
    }
}
