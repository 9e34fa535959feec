use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};
use uuid::Uuid;

use common::actors::{Actor, ActorType, ControlMessage};

/// Ordered local view of received log lines. Lines are only ever appended,
/// in arrival order; readers get clones.
#[derive(Clone, Default)]
pub struct LogView {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, line: String) {
        self.lines.lock().await.push(line);
    }

    pub async fn lines(&self) -> Vec<String> {
        self.lines.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.lines.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lines.lock().await.is_empty()
    }
}

/// Handle for tearing the client down. Dropping it unsubscribes too.
pub struct StreamShutdown {
    tx: mpsc::Sender<()>,
}

impl StreamShutdown {
    pub fn shutdown(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Long-lived subscriber of the log stream endpoint. Appends every received
/// text line to its view, reconnects with doubling backoff (2s, capped at
/// 30s, retrying indefinitely), and stops appending the moment it is shut
/// down.
pub struct LogStreamClient {
    id: Uuid,
    url: String,
    view: LogView,
    shutdown_rx: mpsc::Receiver<()>,
}

#[async_trait]
impl Actor for LogStreamClient {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> ActorType {
        ActorType::StreamClientActor
    }

    async fn run(&mut self, supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        let heartbeat_handle = self.spawn_heartbeat(supervisor_tx.clone());
        let mut backoff = Duration::from_secs(2);

        loop {
            let connect = tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    return Self::finish(self.name(), heartbeat_handle, supervisor_tx).await;
                }
                conn = tokio_tungstenite::connect_async(self.url.as_str()) => conn,
            };

            match connect {
                Ok((ws_stream, _)) => {
                    info!("Connected to log stream at {}", self.url);
                    backoff = Duration::from_secs(2);

                    let (mut write, mut read) = ws_stream.split();

                    loop {
                        tokio::select! {
                            biased;
                            // Checked first so nothing is appended after an
                            // unsubscribe, even with frames already in flight.
                            _ = self.shutdown_rx.recv() => {
                                let _ = write.close().await;
                                return Self::finish(self.name(), heartbeat_handle, supervisor_tx).await;
                            }
                            msg = read.next() => match msg {
                                Some(Ok(Message::Text(ref text))) => {
                                    self.view.append(text.as_str().to_string()).await;
                                }
                                Some(Ok(Message::Ping(payload))) => {
                                    let _ = write.send(Message::Pong(payload)).await;
                                }
                                Some(Ok(Message::Close(_))) | None => {
                                    debug!("Log stream closed by server");
                                    break;
                                }
                                Some(Err(e)) => {
                                    error!("Log stream error: {}", e);
                                    break;
                                }
                                Some(Ok(_)) => {}
                            }
                        }
                    }
                }
                Err(e) => {
                    supervisor_tx
                        .send(ControlMessage::Error(
                            self.name(),
                            format!("Connect to {} failed: {}", self.url, e),
                        ))
                        .await?;
                }
            }

            debug!("Reconnecting to {} in {:?}", self.url, backoff);
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    return Self::finish(self.name(), heartbeat_handle, supervisor_tx).await;
                }
                _ = time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(Duration::from_secs(30));
        }
    }
}

impl LogStreamClient {
    pub fn new(url: impl Into<String>, view: LogView) -> (Self, StreamShutdown) {
        let (tx, rx) = mpsc::channel(1);
        (
            Self {
                id: Uuid::new_v4(),
                url: url.into(),
                view,
                shutdown_rx: rx,
            },
            StreamShutdown { tx },
        )
    }

    async fn finish(
        name: ActorType,
        heartbeat_handle: JoinHandle<()>,
        supervisor_tx: mpsc::Sender<ControlMessage>,
    ) -> anyhow::Result<()> {
        heartbeat_handle.abort();
        supervisor_tx.send(ControlMessage::Shutdown(name)).await?;
        info!("Log stream client shut down");
        Ok(())
    }
}
