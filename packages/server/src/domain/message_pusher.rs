//! メッセージ送信（通知）の trait 定義
//!
//! UseCase 層はこの trait を通じてトピックの購読者へメッセージを届けます。
//! WebSocket などの具体的な送信手段は Infrastructure 層が実装します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    error::MessagePushError,
    value_object::{SocketId, Topic},
};

/// 購読者 1 人分の送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// トピック単位でメッセージを届ける trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// トピックに購読者を登録
    async fn register_subscriber(&self, topic: &Topic, socket_id: SocketId, sender: PusherChannel);

    /// 購読を解除（存在しなくてもエラーにしない）
    async fn unregister_subscriber(&self, topic: &Topic, socket_id: &SocketId);

    /// トピックの購読者一覧
    async fn subscribers(&self, topic: &Topic) -> Vec<SocketId>;

    /// 複数の購読者に送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<SocketId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
