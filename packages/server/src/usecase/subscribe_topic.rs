//! UseCase: トピックの購読
//!
//! WebSocket 接続を Room のトピックに登録します。
//! 購読は Room の存在だけを確認し、認証は求めません。
//! ソケット ID は UI 層が払い出し、登録前に `connection-established` を送れるようにします。
//! UI 層はアップグレード前に `check` で Room を確認し、登録（`execute`）は
//! アップグレード完了後に行います。

use std::sync::Arc;

use crate::domain::{MessagePusher, PusherChannel, RoomId, RoomRepository, SocketId, Topic};

use super::error::SubscribeError;

/// トピック購読のユースケース
pub struct SubscribeTopicUseCase {
    room_repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SubscribeTopicUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            room_repository,
            message_pusher,
        }
    }

    /// Room が購読可能か確認し、購読先のトピックを返す（登録はしない）
    pub async fn check(&self, room_id: &RoomId) -> Result<Topic, SubscribeError> {
        self.room_repository
            .find(room_id)
            .await
            .map_err(|_| SubscribeError::RoomNotFound(room_id.to_string()))?;
        Ok(Topic::for_room(room_id))
    }

    /// ソケットを Room のトピックに登録し、登録先のトピックを返す
    pub async fn execute(
        &self,
        room_id: &RoomId,
        socket_id: SocketId,
        sender: PusherChannel,
    ) -> Result<Topic, SubscribeError> {
        // 1. Room の存在確認
        let topic = self.check(room_id).await?;

        // 2. トピックに登録
        self.message_pusher
            .register_subscriber(&topic, socket_id.clone(), sender)
            .await;
        tracing::info!("Socket '{}' joined '{}'", socket_id, topic);

        Ok(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{LanguageId, MockMessagePusher, Room, Timestamp, UserId},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 存在する Room のトピックにだけ購読者が登録されること
    //
    // 【どのようなシナリオをテストするか】
    // 1. 存在する Room への購読は成功し、MessagePusher に登録される
    // 2. 存在しない Room への購読は失敗し、何も登録されない
    // 3. 事前確認だけでは登録されない
    // ========================================

    async fn create_test_repository() -> Arc<InMemoryRoomRepository> {
        let repository = Arc::new(InMemoryRoomRepository::new());
        repository
            .create(Room::new(
                RoomId::new("R1").unwrap(),
                "pairing".to_string(),
                LanguageId::new("javascript").unwrap(),
                UserId::new("alice-id").unwrap(),
                Timestamp::new(0),
            ))
            .await
            .unwrap();
        repository
    }

    #[tokio::test]
    async fn test_subscribe_registers_socket() {
        // テスト項目: 購読すると `room-{id}` トピックに登録される
        // given (前提条件):
        let repository = create_test_repository().await;
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_register_subscriber()
            .withf(|topic, _, _| topic.as_str() == "room-R1")
            .times(1)
            .returning(|_, _, _| ());
        let usecase = SubscribeTopicUseCase::new(repository, Arc::new(pusher));
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase
            .execute(&RoomId::new("R1").unwrap(), SocketId::new("s1").unwrap(), tx)
            .await;

        // then (期待する結果):
        assert_eq!(result.map(|topic| topic.to_string()), Ok("room-R1".to_string()));
    }

    #[tokio::test]
    async fn test_subscribe_to_missing_room() {
        // テスト項目: 存在しない Room のトピックは購読できない
        // given (前提条件):
        let repository = create_test_repository().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_register_subscriber().times(0);
        let usecase = SubscribeTopicUseCase::new(repository, Arc::new(pusher));
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase
            .execute(&RoomId::new("nope").unwrap(), SocketId::new("s1").unwrap(), tx)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SubscribeError::RoomNotFound("nope".to_string())));
    }

    #[tokio::test]
    async fn test_check_does_not_register() {
        // テスト項目: アップグレード前の確認ではトピックに登録しない
        // given (前提条件):
        let repository = create_test_repository().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_register_subscriber().times(0);
        let usecase = SubscribeTopicUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let found = usecase.check(&RoomId::new("R1").unwrap()).await;
        let missing = usecase.check(&RoomId::new("nope").unwrap()).await;

        // then (期待する結果):
        assert_eq!(found.map(|topic| topic.to_string()), Ok("room-R1".to_string()));
        assert_eq!(missing, Err(SubscribeError::RoomNotFound("nope".to_string())));
    }
}
