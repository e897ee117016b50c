use crate::messages::{ClientToServer, CoordinatorMessage};
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, Stream, StreamExt};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Identity of one socket, independent of whatever user id the client claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending side of a connection. The socket stays open for as long as the hub
/// holds the handle; dropping it makes the writer close the socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Arc<str>>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::UnboundedSender<Arc<str>>) -> Self {
        Self {
            id: ConnectionId::new(),
            tx,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// False once the writer task has gone away.
    pub fn is_ready(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn deliver(&self, frame: Arc<str>) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// Lets shutdown wait, within a bound, for writers to flush their last frames.
///
/// Every writer task holds a [`WriterGuard`]; the drain completes once all of
/// them are gone.
#[derive(Debug)]
pub struct WriterDrain {
    tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<()>,
}

#[derive(Debug, Clone)]
pub struct WriterGuard {
    _tx: mpsc::Sender<()>,
}

impl WriterDrain {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self { tx, rx }
    }

    pub fn guard(&self) -> WriterGuard {
        WriterGuard {
            _tx: self.tx.clone(),
        }
    }

    /// Returns false if some writer was still running after `limit`.
    pub async fn wait(self, limit: Duration) -> bool {
        let Self { tx, mut rx } = self;
        drop(tx);
        time::timeout(limit, rx.recv()).await.is_ok()
    }
}

/// Drives one WebSocket: forwards decoded messages to the hub and writes
/// whatever the hub queues for this connection.
pub async fn handle_client(
    socket: WebSocket,
    addr: SocketAddr,
    hub_tx: mpsc::UnboundedSender<CoordinatorMessage>,
    guard: WriterGuard,
) {
    let (ws_sender, ws_receiver) = socket.split();
    let (writer_tx, writer_rx) = mpsc::unbounded_channel::<Arc<str>>();

    let connection = ConnectionHandle::new(writer_tx);
    let connection_id = connection.id();

    info!("Client {} connected from {}", connection_id, addr);

    let write_task = tokio::spawn(handle_client_writer(ws_sender, writer_rx, guard));

    read_frames(ws_receiver, connection, &hub_tx).await;

    write_task.abort();

    debug!("Client {} cleanup complete", connection_id);
}

/// Hands `connection` to the hub, forwards every frame that decodes until the
/// peer closes or the transport fails, then reports the disconnect once.
async fn read_frames<St, E>(
    mut frames: St,
    connection: ConnectionHandle,
    hub_tx: &mpsc::UnboundedSender<CoordinatorMessage>,
) where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let connection_id = connection.id();

    if hub_tx
        .send(CoordinatorMessage::Connected { connection })
        .is_err()
    {
        error!("Round hub is gone, dropping client {}", connection_id);
        return;
    }

    while let Some(frame) = frames.next().await {
        let decoded = match frame {
            Ok(Message::Text(text)) => ClientToServer::from_json(&text),
            Ok(Message::Binary(bytes)) => ClientToServer::from_slice(&bytes),
            Ok(Message::Close(_)) => {
                info!("Client {} closed the connection", connection_id);
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                error!("Client {} transport error: {}", connection_id, e);
                break;
            }
        };

        match decoded {
            Ok(action) => {
                if hub_tx
                    .send(CoordinatorMessage::ClientAction {
                        connection_id,
                        action,
                    })
                    .is_err()
                {
                    error!("Round hub is gone, dropping client {}", connection_id);
                    break;
                }
            }
            Err(e) => {
                warn!("Failed to parse message from {}: {}", connection_id, e);
            }
        }
    }

    // Cleanup on disconnect
    let _ = hub_tx.send(CoordinatorMessage::Disconnected { connection_id });
}

async fn handle_client_writer(
    mut writer: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Arc<str>>,
    _guard: WriterGuard,
) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = writer.send(Message::Text(frame.to_string())).await {
            error!("Failed to write to client: {}", e);
            return;
        }
    }

    // The hub dropped this connection
    let _ = writer.send(Message::Close(None)).await;
}
