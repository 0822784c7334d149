//! WebSocket subscription handler.
//!
//! `GET /ws?topic=room-{room_id}` subscribes the connection to a room topic.
//! The first frame is always `connection-established` with the socket id the
//! client may send back as `X-Socket-Id` when publishing.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{SocketId, SocketIdFactory, Topic},
    infrastructure::dto::websocket::{ConnectionEstablishedPayload, TopicMessage},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub topic: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscribeQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let (_, room_id) = Topic::parse(&query.topic).map_err(|e| {
        tracing::warn!("Rejected subscription to '{}': {}", query.topic, e);
        StatusCode::BAD_REQUEST
    })?;
    // Unknown rooms are refused before the upgrade; registration waits for the socket
    state
        .subscribe_topic_usecase
        .check(&room_id)
        .await
        .map_err(|e| {
            tracing::warn!("Rejected subscription: {}", e);
            StatusCode::NOT_FOUND
        })?;
    let socket_id = SocketIdFactory::generate().map_err(|e| {
        tracing::error!("Failed to generate socket id: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // Create a channel for this socket to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // connection-established is queued before registration so it is the first frame
    let welcome = TopicMessage::ConnectionEstablished(ConnectionEstablishedPayload {
        socket_id: socket_id.to_string(),
    });
    let welcome_json = serde_json::to_string(&welcome).map_err(|e| {
        tracing::error!("Failed to encode connection-established: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    tx.send(welcome_json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(ws.on_upgrade(move |socket| async move {
        let topic = match state
            .subscribe_topic_usecase
            .execute(&room_id, socket_id.clone(), tx)
            .await
        {
            Ok(topic) => topic,
            Err(e) => {
                tracing::warn!("Dropping socket '{}': {}", socket_id, e);
                return;
            }
        };
        handle_socket(socket, state, topic, socket_id, rx).await;
    }))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    topic: Topic,
    socket_id: SocketId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    // Subscribers only listen; mutations arrive over HTTP
    let socket_id_for_recv = socket_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Socket '{}' requested close", socket_id_for_recv);
                    break;
                }
                Ok(Message::Text(text)) => {
                    tracing::debug!("Ignoring text frame from '{}': {}", socket_id_for_recv, text);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", socket_id_for_recv, e);
                    break;
                }
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let remaining = state
        .unsubscribe_topic_usecase
        .execute(&topic, &socket_id)
        .await;
    tracing::info!(
        "Socket '{}' left '{}' ({} subscriber(s) remaining)",
        socket_id,
        topic,
        remaining
    );
}
