//! Socket transport
//!
//! Owns one WebSocket connection per authenticated session and exposes a
//! minimal send/receive surface. Outgoing frames are sent only while the
//! connection is open (silent no-op otherwise, no queuing); incoming
//! frames are dispatched to a single registered listener. Unexpected
//! closes trigger fixed-attempt reconnection with linearly increasing
//! delay; after the ceiling the transport parks in `Failed` without
//! surfacing a terminal error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use campusline_shared::{SessionToken, ThreadId};

use crate::config::RealtimeConfig;
use crate::error::{SocketError, SocketResult};

use super::frames::SocketFrame;
use super::state::{ConnectionState, ReconnectPolicy};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Registered inbound-frame callback; exactly one at a time
type FrameListener = Box<dyn Fn(SocketFrame) + Send + Sync + 'static>;

/// Tunables for the socket transport
#[derive(Debug, Clone, Copy)]
pub struct SocketOptions {
    /// How long `connect()` waits for the open signal
    pub connect_timeout: Duration,
    /// Reconnection schedule applied after unexpected closes
    pub reconnect: ReconnectPolicy,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl SocketOptions {
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            ..Self::default()
        }
    }
}

/// Maintains one live bidirectional connection to the chat endpoint
pub struct SocketTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    /// Chat endpoint with the bearer token appended as a query parameter
    endpoint: Url,
    options: SocketOptions,
    state: RwLock<ConnectionState>,
    writer: Mutex<Option<WsSink>>,
    listener: RwLock<Option<FrameListener>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
    reconnect_task: Mutex<Option<JoinHandle<()>>>,
    shutdown: AtomicBool,
}

impl SocketTransport {
    /// Create a transport for the given endpoint and session.
    ///
    /// The token travels as a `token` query parameter, matching the
    /// backend's socket authentication contract.
    pub fn new(
        socket_url: &str,
        token: &SessionToken,
        options: SocketOptions,
    ) -> SocketResult<Self> {
        let mut endpoint = Url::parse(socket_url)?;
        endpoint
            .query_pairs_mut()
            .append_pair("token", token.as_str());

        Ok(Self {
            inner: Arc::new(TransportInner {
                endpoint,
                options,
                state: RwLock::new(ConnectionState::Idle),
                writer: Mutex::new(None),
                listener: RwLock::new(None),
                reader_task: Mutex::new(None),
                reconnect_task: Mutex::new(None),
                shutdown: AtomicBool::new(false),
            }),
        })
    }

    /// Open the connection, resolving once the socket reports open.
    ///
    /// Fails with `ConnectionTimeout` if no open signal arrives in time,
    /// or `ConnectionClosed` if the socket closes first. A close on this
    /// first attempt is returned to the caller and still starts the
    /// automatic reconnect cycle; a timeout does not (the handshake is
    /// abandoned, so no close is ever observed).
    pub async fn connect(&self) -> SocketResult<()> {
        self.inner.shutdown.store(false, Ordering::SeqCst);
        *self.inner.state.write().await = ConnectionState::Connecting;

        let handshake = tokio::time::timeout(
            self.inner.options.connect_timeout,
            TransportInner::open_socket(&self.inner),
        )
        .await;

        match handshake {
            Err(_) => {
                *self.inner.state.write().await = ConnectionState::Idle;
                Err(SocketError::ConnectionTimeout(
                    self.inner.options.connect_timeout,
                ))
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "socket failed to open");
                TransportInner::spawn_reconnect(Arc::clone(&self.inner)).await;
                Err(err)
            }
            Ok(Ok(stream)) => {
                TransportInner::install(Arc::clone(&self.inner), stream).await;
                Ok(())
            }
        }
    }

    /// Subscribe to a thread's updates; silent no-op while not open
    pub async fn subscribe_to_thread(&self, thread_id: ThreadId) -> SocketResult<()> {
        self.send_frame(SocketFrame::SubscribeThread { thread_id })
            .await
    }

    /// Send a text message into a thread; silent no-op while not open
    pub async fn send_message(&self, thread_id: ThreadId, content: &str) -> SocketResult<()> {
        self.send_frame(SocketFrame::send_text(thread_id, content))
            .await
    }

    /// Register the inbound-frame listener.
    ///
    /// Exactly one listener is held; a later registration replaces the
    /// earlier one. There is no fan-out.
    pub async fn on_message<F>(&self, callback: F)
    where
        F: Fn(SocketFrame) + Send + Sync + 'static,
    {
        *self.inner.listener.write().await = Some(Box::new(callback));
    }

    /// Close the connection and clear the handle; idempotent
    pub async fn disconnect(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);

        if let Some(task) = self.inner.reconnect_task.lock().await.take() {
            task.abort();
        }

        let mut writer = self.inner.writer.lock().await;
        if let Some(mut sink) = writer.take() {
            let _ = sink.send(Message::Close(None)).await;
        }
        drop(writer);

        if let Some(task) = self.inner.reader_task.lock().await.take() {
            task.abort();
        }

        *self.inner.state.write().await = ConnectionState::Idle;
        tracing::info!("chat socket disconnected");
    }

    /// True iff a connection handle exists and reports the open state
    pub async fn is_connected(&self) -> bool {
        self.inner.state.read().await.is_open() && self.inner.writer.lock().await.is_some()
    }

    /// Current connection state
    pub async fn state(&self) -> ConnectionState {
        *self.inner.state.read().await
    }

    async fn send_frame(&self, frame: SocketFrame) -> SocketResult<()> {
        if !self.inner.state.read().await.is_open() {
            tracing::debug!("socket not open; dropping outbound frame");
            return Ok(());
        }

        let json = serde_json::to_string(&frame)?;
        let mut writer = self.inner.writer.lock().await;
        if let Some(sink) = writer.as_mut() {
            sink.send(Message::Text(json)).await?;
        }
        Ok(())
    }
}

impl TransportInner {
    async fn open_socket(inner: &TransportInner) -> SocketResult<WsStream> {
        match connect_async(inner.endpoint.as_str()).await {
            Ok((stream, _response)) => Ok(stream),
            Err(err) => Err(close_error(err)),
        }
    }

    /// Adopt a freshly opened stream: store the write half, mark the state
    /// open (resetting the attempt counter), and start the reader task.
    async fn install(inner: Arc<TransportInner>, stream: WsStream) {
        let (sink, source) = stream.split();
        *inner.writer.lock().await = Some(sink);
        *inner.state.write().await = ConnectionState::Open;
        tracing::info!("chat socket open");

        let task = tokio::spawn(read_loop(Arc::clone(&inner), source));
        *inner.reader_task.lock().await = Some(task);
    }

    async fn spawn_reconnect(inner: Arc<TransportInner>) {
        let task = tokio::spawn(reconnect_loop(Arc::clone(&inner)));
        *inner.reconnect_task.lock().await = Some(task);
    }
}

/// Reads until the connection ends, dispatching frames to the listener.
/// Malformed frames are logged and dropped without closing the connection.
async fn read_loop(inner: Arc<TransportInner>, mut source: WsSource) {
    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<SocketFrame>(&text) {
                Ok(frame) => {
                    let listener = inner.listener.read().await;
                    match listener.as_ref() {
                        Some(callback) => callback(frame),
                        None => tracing::debug!("frame received with no listener registered"),
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, payload = %text, "failed to parse socket frame");
                }
            },
            Ok(Message::Close(frame)) => {
                let (code, reason) = match frame {
                    Some(f) => (Some(u16::from(f.code)), f.reason.to_string()),
                    None => (None, String::new()),
                };
                tracing::info!(code = ?code, reason = %reason, "socket close frame received");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(_) => {} // binary frames are not part of the protocol
            Err(err) => {
                tracing::warn!(error = %err, "socket read error");
                break;
            }
        }
    }

    inner.writer.lock().await.take();

    if inner.shutdown.load(Ordering::SeqCst) {
        *inner.state.write().await = ConnectionState::Idle;
        return;
    }

    tracing::warn!("chat socket closed unexpectedly");
    TransportInner::spawn_reconnect(inner).await;
}

/// Retries the handshake on the linear schedule until it succeeds, the
/// shutdown flag is raised, or the attempt ceiling is reached. Errors here
/// are only observable via logs; the caller is never notified.
///
/// Returns a boxed future: the reconnect/read/install tasks spawn each
/// other recursively, and the opaque-type cycle defeats auto-trait (`Send`)
/// inference unless one link in the chain has a concrete type.
fn reconnect_loop(inner: Arc<TransportInner>) -> futures::future::BoxFuture<'static, ()> {
    Box::pin(async move {
    loop {
        let attempt = {
            let mut state = inner.state.write().await;
            // a disconnect can land between the close that spawned this
            // loop and the first attempt; settle on Idle rather than
            // advertising a retry that will never run
            if inner.shutdown.load(Ordering::SeqCst) {
                *state = ConnectionState::Idle;
                return;
            }
            match state.next_attempt(&inner.options.reconnect) {
                Some(n) => {
                    *state = ConnectionState::Reconnecting(n);
                    n
                }
                None => {
                    *state = ConnectionState::Failed;
                    tracing::error!(
                        max_attempts = inner.options.reconnect.max_attempts,
                        "reconnect ceiling reached; giving up"
                    );
                    return;
                }
            }
        };

        let delay = inner.options.reconnect.delay_for(attempt);
        tracing::info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "scheduling socket reconnect"
        );
        tokio::time::sleep(delay).await;

        if inner.shutdown.load(Ordering::SeqCst) {
            *inner.state.write().await = ConnectionState::Idle;
            return;
        }

        let handshake = tokio::time::timeout(
            inner.options.connect_timeout,
            TransportInner::open_socket(&inner),
        )
        .await;

        match handshake {
            Ok(Ok(stream)) => {
                if inner.shutdown.load(Ordering::SeqCst) {
                    *inner.state.write().await = ConnectionState::Idle;
                    return;
                }
                tracing::info!(attempt, "socket reconnected");
                TransportInner::install(Arc::clone(&inner), stream).await;
                return;
            }
            Ok(Err(err)) => {
                tracing::warn!(attempt, error = %err, "reconnect attempt failed");
            }
            Err(_) => {
                tracing::warn!(attempt, "reconnect attempt timed out");
            }
        }
    }
    })
}

/// Map a handshake failure to the close error surfaced by `connect()`
fn close_error(err: WsError) -> SocketError {
    match err {
        WsError::Http(response) => SocketError::ConnectionClosed {
            code: Some(response.status().as_u16()),
            reason: "handshake rejected".to_string(),
        },
        other => SocketError::ConnectionClosed {
            code: None,
            reason: other.to_string(),
        },
    }
}
