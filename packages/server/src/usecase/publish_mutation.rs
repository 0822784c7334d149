//! UseCase: ミューテーションの publish
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PublishMutationUseCase::execute() メソッド
//! - 種類ごとの最新値の永続化と、トピック購読者へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 後から参加したセッションは永続化されたスナップショットに依存する
//! - 同じ種類の publish は後勝ちで上書きされる
//! - `X-Socket-Id` で指定された購読者にはエコーを返さない
//!
//! ### どのような状況を想定しているか
//! - 正常系：購読者全員へのブロードキャスト
//! - 正常系：送信元ソケットを除いたブロードキャスト
//! - 異常系：存在しない Room

use std::sync::Arc;

use coderoom_shared::time::Clock;

use crate::domain::{
    MessagePusher, MutationEvent, RepositoryError, RoomId, RoomRepository, SocketId, Timestamp,
    Topic,
};

use super::error::PublishMutationError;

/// ミューテーション publish のユースケース
pub struct PublishMutationUseCase {
    /// Repository（データアクセス層の抽象化）
    room_repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl PublishMutationUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            room_repository,
            message_pusher,
            clock,
        }
    }

    /// ミューテーションを永続化し、Room のトピックへ再配信する
    ///
    /// # Arguments
    ///
    /// * `room_id` - 対象の Room
    /// * `event` - 呼び出し元の ID が付与されたイベント
    /// * `json_message` - 配信する JSON（DTO 層で生成されたもの）
    /// * `exclude` - 配信対象から外すソケット（送信元）
    ///
    /// # Returns
    ///
    /// 配信対象のソケット ID。受信の完了は待たない。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        event: &MutationEvent,
        json_message: String,
        exclude: Option<SocketId>,
    ) -> Result<Vec<SocketId>, PublishMutationError> {
        let now = Timestamp::new(self.clock.now_millis());

        // 1. 種類ごとの最新値を上書き（後勝ち）
        self.room_repository
            .apply_mutation(room_id, &event.mutation, now)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound(id) => PublishMutationError::RoomNotFound(id),
                other => PublishMutationError::BroadcastFailed(other.to_string()),
            })?;

        // 2. 配信対象を取得（送信元ソケットを除く）
        let topic = Topic::for_room(room_id);
        let targets: Vec<SocketId> = self
            .message_pusher
            .subscribers(&topic)
            .await
            .into_iter()
            .filter(|socket_id| exclude.as_ref() != Some(socket_id))
            .collect();

        // 3. ブロードキャスト
        self.message_pusher
            .broadcast(targets.clone(), &json_message)
            .await
            .map_err(|e| PublishMutationError::BroadcastFailed(e.to_string()))?;

        tracing::debug!(
            "Published '{}' from '{}' to {} subscriber(s) of '{}'",
            event.kind(),
            event.origin,
            targets.len(),
            topic
        );

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            LanguageId, MockMessagePusher, Mutation, Room, TerminalsSnapshot, UserId,
        },
        infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    };
    use coderoom_shared::time::FixedClock;
    use tokio::sync::mpsc;

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

    fn terminals_event(input: &str) -> MutationEvent {
        MutationEvent::new(
            UserId::new("alice-id").unwrap(),
            Mutation::Terminals(TerminalsSnapshot {
                input: input.to_string(),
                output: String::new(),
                is_loading: false,
            }),
        )
    }

    #[tokio::test]
    async fn test_publish_broadcasts_to_all_subscribers() {
        // テスト項目: 除外指定がなければ全購読者に配信される
        // given (前提条件):
        let repository = create_test_repository().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_subscribers().returning(|_| {
            vec![
                SocketId::new("s1").unwrap(),
                SocketId::new("s2").unwrap(),
            ]
        });
        pusher
            .expect_broadcast()
            .withf(|targets, content| targets.len() == 2 && content.contains("terminals"))
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = PublishMutationUseCase::new(
            repository.clone(),
            Arc::new(pusher),
            Arc::new(FixedClock::new(5000)),
        );

        // when (操作):
        let result = usecase
            .execute(
                &RoomId::new("R1").unwrap(),
                &terminals_event("1"),
                r#"{"event":"terminals-update"}"#.to_string(),
                None,
            )
            .await;

        // then (期待する結果):
        assert_eq!(result.map(|targets| targets.len()), Ok(2));
        let room = repository.find(&RoomId::new("R1").unwrap()).await.unwrap();
        assert_eq!(room.terminals.input, "1");
        assert_eq!(room.updated_at, Timestamp::new(5000));
    }

    #[tokio::test]
    async fn test_publish_excludes_sender_socket() {
        // テスト項目: 送信元ソケットは配信対象から外れる
        // given (前提条件):
        let repository = create_test_repository().await;
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let topic = Topic::for_room(&RoomId::new("R1").unwrap());
        let (alice_tx, mut alice_rx) = mpsc::unbounded_channel();
        let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
        pusher
            .register_subscriber(&topic, SocketId::new("alice-socket").unwrap(), alice_tx)
            .await;
        pusher
            .register_subscriber(&topic, SocketId::new("bob-socket").unwrap(), bob_tx)
            .await;
        let usecase = PublishMutationUseCase::new(
            repository,
            pusher,
            Arc::new(FixedClock::new(5000)),
        );

        // when (操作):
        let targets = usecase
            .execute(
                &RoomId::new("R1").unwrap(),
                &terminals_event("1"),
                "payload".to_string(),
                Some(SocketId::new("alice-socket").unwrap()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(targets, vec![SocketId::new("bob-socket").unwrap()]);
        assert_eq!(bob_rx.recv().await, Some("payload".to_string()));
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_last_write_wins() {
        // テスト項目: 同じ種類の publish は後から届いたものが残る
        // given (前提条件):
        let repository = create_test_repository().await;
        let usecase = PublishMutationUseCase::new(
            repository.clone(),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(FixedClock::new(5000)),
        );
        let room_id = RoomId::new("R1").unwrap();

        // when (操作):
        usecase
            .execute(&room_id, &terminals_event("A"), "a".to_string(), None)
            .await
            .unwrap();
        usecase
            .execute(&room_id, &terminals_event("B"), "b".to_string(), None)
            .await
            .unwrap();

        // then (期待する結果):
        let room = repository.find(&room_id).await.unwrap();
        assert_eq!(room.terminals.input, "B");
    }

    #[tokio::test]
    async fn test_publish_to_missing_room() {
        // テスト項目: 存在しない Room への publish はブロードキャストせずにエラーを返す
        // given (前提条件):
        let repository = create_test_repository().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().times(0);
        let usecase = PublishMutationUseCase::new(
            repository,
            Arc::new(pusher),
            Arc::new(FixedClock::new(5000)),
        );

        // when (操作):
        let result = usecase
            .execute(
                &RoomId::new("missing").unwrap(),
                &terminals_event("1"),
                "payload".to_string(),
                None,
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PublishMutationError::RoomNotFound("missing".to_string()))
        );
    }
}
