//! Shared-state channel: the WebSocket subscription to a room topic.
//!
//! `subscribe` connects once and never retries. The first frame from the relay
//! is `connection-established`, which carries the socket id of this
//! subscription. Every following frame is decoded into a [`MutationEvent`]
//! and handed, on the reader task, to the handlers bound for its kind in the
//! order they were bound.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use coderoom_server::{
    domain::{MutationEvent, MutationKind, RoomId, SocketId, Topic},
    infrastructure::dto::websocket::TopicMessage,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::{net::TcpStream, sync::watch, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

pub type EventHandler = Arc<dyn Fn(&MutationEvent) + Send + Sync>;

/// How long to wait for `connection-established`
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Handlers bound per mutation kind
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<MutationKind, Vec<EventHandler>>>,
    closed: AtomicBool,
}

impl HandlerRegistry {
    pub fn bind(&self, kind: MutationKind, handler: EventHandler) {
        if self.is_closed() {
            tracing::debug!("Channel closed, not binding {}", kind);
            return;
        }
        self.lock().entry(kind).or_default().push(handler);
    }

    pub fn unbind(&self, kind: MutationKind) {
        self.lock().remove(&kind);
    }

    /// Release every handler; nothing is dispatched afterwards. Returns whether
    /// this call did the closing.
    pub fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        self.lock().clear();
        first
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Invoke every handler bound for the event's kind. Returns how many ran.
    pub fn dispatch(&self, event: &MutationEvent) -> usize {
        if self.is_closed() {
            return 0;
        }
        // handlers run without the lock so they may bind or unbind
        let handlers = self.lock().get(&event.kind()).cloned().unwrap_or_default();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MutationKind, Vec<EventHandler>>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
pub struct ChannelClient {
    ws_url: String,
}

impl ChannelClient {
    /// `ws_url` is the relay's subscription endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    /// Derive the subscription endpoint from the relay's HTTP origin.
    pub fn from_http_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        Self::new(format!("{}/ws", ws_base))
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    pub async fn subscribe(&self, room_id: &RoomId) -> Result<ChannelHandle, ClientError> {
        let topic = Topic::for_room(room_id);
        let url = format!("{}?topic={}", self.ws_url, topic);

        let (ws_stream, _) = connect_async(&url)
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        let (write, mut read) = ws_stream.split();

        let socket_id = match tokio::time::timeout(HANDSHAKE_TIMEOUT, read.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                match serde_json::from_str::<TopicMessage>(&text) {
                    Ok(TopicMessage::ConnectionEstablished(payload)) => {
                        SocketId::new(payload.socket_id).ok()
                    }
                    _ => {
                        tracing::warn!("Unexpected first frame on {}: {}", topic, text.as_str());
                        None
                    }
                }
            }
            Ok(Some(Ok(other))) => {
                tracing::warn!("Unexpected first frame on {}: {:?}", topic, other);
                None
            }
            Ok(Some(Err(e))) => return Err(ClientError::ConnectionError(e.to_string())),
            Ok(None) => {
                return Err(ClientError::ConnectionError(
                    "connection closed during handshake".to_string(),
                ));
            }
            Err(_) => {
                return Err(ClientError::ConnectionError(
                    "timed out waiting for connection-established".to_string(),
                ));
            }
        };
        tracing::info!("Subscribed to {} (socket {:?})", topic, socket_id);

        let registry = Arc::new(HandlerRegistry::default());
        let (disconnected_tx, disconnected_rx) = watch::channel(false);

        let reader_registry = registry.clone();
        let reader_topic = topic.clone();
        let reader = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => handle_frame(&reader_registry, &text),
                    Ok(Message::Close(_)) => {
                        tracing::info!("Relay closed {}", reader_topic);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error on {}: {}", reader_topic, e);
                        break;
                    }
                    _ => {}
                }
            }
            let _ = disconnected_tx.send(true);
        });

        Ok(ChannelHandle {
            topic,
            socket_id,
            registry,
            writer: Mutex::new(Some(write)),
            reader,
            disconnected: disconnected_rx,
        })
    }
}

fn handle_frame(registry: &HandlerRegistry, text: &str) {
    let message = match serde_json::from_str::<TopicMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Ignoring malformed frame: {}", e);
            return;
        }
    };
    match MutationEvent::try_from(message) {
        Ok(event) => {
            let handled = registry.dispatch(&event);
            tracing::trace!("{} dispatched to {} handler(s)", event.kind(), handled);
        }
        Err(e) => tracing::debug!("Ignoring frame: {}", e),
    }
}

/// A live subscription. Dropping it tears the subscription down.
pub struct ChannelHandle {
    topic: Topic,
    socket_id: Option<SocketId>,
    registry: Arc<HandlerRegistry>,
    writer: Mutex<Option<WsSink>>,
    reader: JoinHandle<()>,
    disconnected: watch::Receiver<bool>,
}

impl ChannelHandle {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn socket_id(&self) -> Option<&SocketId> {
        self.socket_id.as_ref()
    }

    pub fn bind<F>(&self, kind: MutationKind, handler: F)
    where
        F: Fn(&MutationEvent) + Send + Sync + 'static,
    {
        self.registry.bind(kind, Arc::new(handler));
    }

    pub fn unbind(&self, kind: MutationKind) {
        self.registry.unbind(kind);
    }

    /// Release every handler and the topic subscription. Safe to call twice.
    pub fn unsubscribe_all(&self) {
        if !self.registry.close() {
            return;
        }
        self.reader.abort();

        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(mut writer) = writer {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        let _ = writer.close().await;
                    });
                }
                Err(_) => drop(writer),
            }
        }
        tracing::info!("Unsubscribed from {}", self.topic);
    }

    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }

    /// Resolves once the relay side of the connection is gone.
    pub async fn disconnected(&self) {
        let mut rx = self.disconnected.clone();
        let _ = rx.wait_for(|gone| *gone).await;
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}
