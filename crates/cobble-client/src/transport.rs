//! TCP transport for a synchronized world session.
//!
//! Manages the connection lifecycle: connecting, framed receive, and a
//! dedicated send task fed by an unbounded queue so callers never block on
//! the socket. State changes are broadcast via a [`watch`] channel so any
//! number of consumers can react without polling.
//!
//! There is no reconnect: once the stream fails or the server hangs up, the
//! connection transitions to [`ConnectionState::Disconnected`] and stays
//! there.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

use cobble_proto::{
    FrameConfig, FrameError, Message, deserialize_message, read_frame, serialize_message,
    write_frame,
};

/// Lifecycle of the server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// TCP handshake in progress.
    Connecting,
    /// Stream is up and the background tasks are running.
    Connected,
    /// Closed, failed, or hung up. Terminal; there is no reconnect.
    Disconnected,
}

/// Shared, observable connection state.
///
/// Wraps a [`watch`] sender so the owner can flip the state while any
/// number of subscribers await transitions. The state is stored even when
/// nobody is subscribed.
pub struct ConnectionStateWatch {
    tx: watch::Sender<ConnectionState>,
}

impl Default for ConnectionStateWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateWatch {
    /// Starts out [`ConnectionState::Disconnected`].
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionState::Disconnected);
        Self { tx }
    }

    /// Store a new state and wake all subscribers.
    pub fn set(&self, state: ConnectionState) {
        self.tx.send_replace(state);
    }

    /// Mint a receiver for awaiting transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    /// The state right now.
    pub fn current(&self) -> ConnectionState {
        *self.tx.borrow()
    }
}

/// The connection is gone; the message was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("connection lost")]
pub struct ConnectionLost;

/// Receives every decoded inbound message.
///
/// Called from the connection's receive task, so implementations should do
/// cheap work and leave anything heavy to the simulation tick.
pub trait MessageHandler: Send + 'static {
    /// Process a single incoming message.
    fn handle(&mut self, msg: Message);
}

/// Blanket implementation for closures.
impl<F> MessageHandler for F
where
    F: FnMut(Message) + Send + 'static,
{
    fn handle(&mut self, msg: Message) {
        self(msg);
    }
}

/// Cloneable handle that queues outgoing messages for the send task.
///
/// Queueing never blocks. Fails once the send task has exited.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl MessageSender {
    /// Queue a message for sending.
    pub fn send(&self, msg: Message) -> Result<(), ConnectionLost> {
        self.tx.send(msg).map_err(|_| ConnectionLost)
    }

    /// Sender wired to a bare channel, for exercising producers without a
    /// socket.
    #[cfg(test)]
    pub(crate) fn test_pair() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

/// Handle to a connected server session.
///
/// Created via [`Connection::connect`]. Owns the outgoing queue, the
/// connection state watch, and a shutdown signal for the background tasks.
pub struct Connection {
    sender: MessageSender,
    state: Arc<ConnectionStateWatch>,
    /// Sending `true` causes the receive and send tasks to exit.
    shutdown_tx: watch::Sender<bool>,
}

impl Connection {
    /// Connect to the server at `addr`.
    ///
    /// After the TCP handshake this returns right away with the background
    /// receive and send tasks already running. Every decoded inbound message
    /// lands in `handler` on the receive task. Nagle's algorithm is disabled
    /// so small intent frames go out immediately.
    pub async fn connect<H: MessageHandler>(
        addr: SocketAddr,
        frame_config: FrameConfig,
        handler: H,
    ) -> std::io::Result<Self> {
        let state = Arc::new(ConnectionStateWatch::new());
        state.set(ConnectionState::Connecting);

        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        state.set(ConnectionState::Connected);

        let (reader, writer) = stream.into_split();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let recv_state = Arc::clone(&state);
        let recv_shutdown = shutdown_rx.clone();
        let recv_config = frame_config.clone();
        let recv_done = shutdown_tx.clone();
        tokio::spawn(async move {
            Self::receive_loop(reader, &recv_config, handler, &recv_state, recv_shutdown).await;
            // Nothing left to send once the reader is gone.
            let _ = recv_done.send(true);
        });

        let send_state = Arc::clone(&state);
        let send_done = shutdown_tx.clone();
        tokio::spawn(async move {
            Self::send_loop(writer, &frame_config, out_rx, &send_state, shutdown_rx).await;
            let _ = send_done.send(true);
        });

        Ok(Self {
            sender: MessageSender { tx: out_tx },
            state,
            shutdown_tx,
        })
    }

    /// Queue a message for sending.
    ///
    /// Fire-and-forget: the send task writes queued messages to the socket
    /// in order. Fails once the connection is gone.
    pub fn send(&self, msg: Message) -> Result<(), ConnectionLost> {
        if self.state.current() == ConnectionState::Disconnected {
            return Err(ConnectionLost);
        }
        self.sender.send(msg)
    }

    /// Cloneable sender for queueing outgoing messages.
    pub fn sender(&self) -> MessageSender {
        self.sender.clone()
    }

    /// Return the connection state watch.
    pub fn state(&self) -> &Arc<ConnectionStateWatch> {
        &self.state
    }

    /// Tear the connection down.
    ///
    /// Flips the state to [`ConnectionState::Disconnected`] at once and
    /// tells both background tasks to exit.
    pub fn close(&self) {
        let _ = self.shutdown_tx.send(true);
        self.state.set(ConnectionState::Disconnected);
    }

    /// Read framed messages until the stream dies or shutdown is signalled.
    ///
    /// Any framing or decode error is fatal: the peer either hung up or
    /// speaks a different protocol, and the stream position can no longer be
    /// trusted.
    async fn receive_loop<H: MessageHandler>(
        mut reader: tokio::net::tcp::OwnedReadHalf,
        config: &FrameConfig,
        mut handler: H,
        state: &ConnectionStateWatch,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                result = read_frame(&mut reader, config) => {
                    match result {
                        Ok(payload) => match deserialize_message(&payload) {
                            Ok(msg) => handler.handle(msg),
                            Err(e) => {
                                tracing::error!(error = %e, "undecodable frame, closing connection");
                                state.set(ConnectionState::Disconnected);
                                break;
                            }
                        },
                        Err(FrameError::ShortRead) => {
                            tracing::info!("server closed the connection");
                            state.set(ConnectionState::Disconnected);
                            break;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "frame read failed, closing connection");
                            state.set(ConnectionState::Disconnected);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Drain the outgoing queue onto the socket until it closes or shutdown
    /// is signalled. A write failure is fatal; a message that fails to
    /// serialize is dropped with an error log and the connection stays up.
    async fn send_loop(
        mut writer: tokio::net::tcp::OwnedWriteHalf,
        config: &FrameConfig,
        mut out_rx: mpsc::UnboundedReceiver<Message>,
        state: &ConnectionStateWatch,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                outgoing = out_rx.recv() => {
                    let Some(msg) = outgoing else {
                        break;
                    };
                    let payload = match serialize_message(&msg) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!(kind = msg.kind(), error = %e, "dropping unserializable message");
                            continue;
                        }
                    };
                    if let Err(e) = write_frame(&mut writer, &payload, config).await {
                        tracing::error!(error = %e, "send failed, closing connection");
                        state.set(ConnectionState::Disconnected);
                        break;
                    }
                }
            }
        }
    }
}
