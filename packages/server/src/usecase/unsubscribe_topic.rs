//! UseCase: トピックの購読解除
//!
//! WebSocket 切断時に購読者を MessagePusher から外します。何度呼んでも安全です。

use std::sync::Arc;

use crate::domain::{MessagePusher, SocketId, Topic};

/// 購読解除のユースケース
pub struct UnsubscribeTopicUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl UnsubscribeTopicUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 購読を解除し、トピックに残っている購読者数を返す
    pub async fn execute(&self, topic: &Topic, socket_id: &SocketId) -> usize {
        self.message_pusher
            .unregister_subscriber(topic, socket_id)
            .await;
        self.message_pusher.subscribers(topic).await.len()
    }
}
