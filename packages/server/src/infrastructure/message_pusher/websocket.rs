//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 購読者ごとの `UnboundedSender` を管理
//! - トピック（`room-{room_id}`）と購読者の対応を管理
//! - トピックの購読者へのメッセージ送信（broadcast）
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、メッセージ送信に使用します。

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, SocketId, Topic};

#[derive(Default)]
struct Registry {
    /// Key: socket id, Value: PusherChannel
    channels: HashMap<SocketId, PusherChannel>,
    /// Key: topic, Value: 購読中の socket id
    topics: HashMap<Topic, HashSet<SocketId>>,
}

/// WebSocket を使った MessagePusher 実装
#[derive(Default, Clone)]
pub struct WebSocketMessagePusher {
    registry: Arc<Mutex<Registry>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_subscriber(&self, topic: &Topic, socket_id: SocketId, sender: PusherChannel) {
        let mut registry = self.registry.lock().await;
        registry
            .topics
            .entry(topic.clone())
            .or_default()
            .insert(socket_id.clone());
        registry.channels.insert(socket_id.clone(), sender);
        tracing::debug!("Socket '{}' subscribed to '{}'", socket_id, topic);
    }

    async fn unregister_subscriber(&self, topic: &Topic, socket_id: &SocketId) {
        let mut registry = self.registry.lock().await;
        registry.channels.remove(socket_id);
        let now_empty = match registry.topics.get_mut(topic) {
            Some(subscribers) => {
                subscribers.remove(socket_id);
                subscribers.is_empty()
            }
            None => false,
        };
        if now_empty {
            registry.topics.remove(topic);
        }
        tracing::debug!("Socket '{}' unsubscribed from '{}'", socket_id, topic);
    }

    async fn subscribers(&self, topic: &Topic) -> Vec<SocketId> {
        let registry = self.registry.lock().await;
        let mut subscribers: Vec<SocketId> = registry
            .topics
            .get(topic)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        subscribers.sort();
        subscribers
    }

    async fn broadcast(
        &self,
        targets: Vec<SocketId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let registry = self.registry.lock().await;

        for target in targets {
            match registry.channels.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("Failed to push message to socket '{}': {}", target, e);
                    } else {
                        tracing::debug!("Broadcasted message to socket '{}'", target);
                    }
                }
                None => {
                    tracing::warn!("Socket '{}' not found during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }
}
