//! Debounced broadcaster.
//!
//! Outbound mutations are debounced per kind, so a burst of keystrokes turns
//! into a single publish of the last buffer. The identity is checked when a
//! flush fires, not when the mutation is scheduled. Failures are logged and
//! dropped; nothing is retried.

use std::{collections::HashMap, sync::Arc, time::Duration};

use coderoom_server::domain::{Mutation, MutationEvent, MutationKind, RoomId};

use crate::{api::RelayPublisher, debounce::Debouncer, session::IdentityGuard};

pub const CODE_QUIET_WINDOW: Duration = Duration::from_millis(50);
pub const STATE_QUIET_WINDOW: Duration = Duration::from_millis(200);

pub fn quiet_window(kind: MutationKind) -> Duration {
    match kind {
        MutationKind::Code => CODE_QUIET_WINDOW,
        MutationKind::Language | MutationKind::Terminals | MutationKind::FileSelection => {
            STATE_QUIET_WINDOW
        }
    }
}

pub struct Broadcaster {
    debouncers: HashMap<MutationKind, Debouncer<Mutation>>,
}

impl Broadcaster {
    /// Must be called from within a tokio runtime.
    pub fn new(room_id: RoomId, guard: IdentityGuard, publisher: Arc<dyn RelayPublisher>) -> Self {
        let debouncers = MutationKind::ALL
            .into_iter()
            .map(|kind| {
                let room_id = room_id.clone();
                let guard = guard.clone();
                let publisher = publisher.clone();
                let debouncer = Debouncer::spawn(quiet_window(kind), move |mutation| {
                    flush(room_id.clone(), guard.clone(), publisher.clone(), mutation)
                });
                (kind, debouncer)
            })
            .collect();
        Self { debouncers }
    }

    pub fn broadcast(&self, mutation: Mutation) {
        match self.debouncers.get(&mutation.kind()) {
            Some(debouncer) => debouncer.schedule(mutation),
            None => tracing::error!("No debouncer for {}", mutation.kind()),
        }
    }

    /// Cancel every pending broadcast (teardown)
    pub fn cancel_all(&self) {
        for debouncer in self.debouncers.values() {
            debouncer.cancel();
        }
    }
}

async fn flush(
    room_id: RoomId,
    guard: IdentityGuard,
    publisher: Arc<dyn RelayPublisher>,
    mutation: Mutation,
) {
    let kind = mutation.kind();
    let Some(identity) = guard.authorize(kind) else {
        return;
    };

    let event = MutationEvent::new(identity.user_id.clone(), mutation);
    match publisher.publish(&identity, &room_id, &event).await {
        Ok(()) => tracing::debug!("Published {} to room {}", kind, room_id),
        Err(e) => tracing::warn!("Failed to publish {} to room {}: {}", kind, room_id, e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use coderoom_server::domain::{
        CodeChange, LanguageId, TerminalsSnapshot, Timestamp, UserId, Username,
    };
    use coderoom_shared::time::FixedClock;

    use super::*;
    use crate::{
        error::ClientError,
        session::{Identity, SessionContext},
    };

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<MutationEvent>>,
        fail: bool,
    }

    impl RecordingPublisher {
        fn events(&self) -> Vec<MutationEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RelayPublisher for RecordingPublisher {
        async fn publish(
            &self,
            _identity: &Identity,
            _room_id: &RoomId,
            event: &MutationEvent,
        ) -> Result<(), ClientError> {
            self.events.lock().unwrap().push(event.clone());
            if self.fail {
                return Err(ClientError::ConnectionError("refused".to_string()));
            }
            Ok(())
        }
    }

    fn signed_in_session() -> SessionContext {
        let session = SessionContext::new(Arc::new(FixedClock::new(1_000_000)));
        session.sign_in(Identity {
            user_id: UserId::new("alice-id").unwrap(),
            username: Username::new("alice").unwrap(),
            email: "a@x.com".to_string(),
            token: "token".to_string(),
            expires_at: 2_000,
        });
        session
    }

    fn code(text: &str) -> Mutation {
        Mutation::Code(CodeChange {
            code: text.to_string(),
            change_line_number: 1,
            timestamp: Timestamp::new(1000),
        })
    }

    fn create_broadcaster(
        session: &SessionContext,
        publisher: Arc<RecordingPublisher>,
    ) -> Broadcaster {
        Broadcaster::new(
            RoomId::new("R1").unwrap(),
            IdentityGuard::new(session.clone()),
            publisher,
        )
    }

    #[test]
    fn test_quiet_windows_per_kind() {
        // テスト項目: コードは 50ms、それ以外は 200ms の窓
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(quiet_window(MutationKind::Code), Duration::from_millis(50));
        assert_eq!(quiet_window(MutationKind::Language), Duration::from_millis(200));
        assert_eq!(quiet_window(MutationKind::Terminals), Duration::from_millis(200));
        assert_eq!(quiet_window(MutationKind::FileSelection), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_burst_is_one_publish_of_last_payload() {
        // テスト項目: 窓内の N 回のコード更新は最後の内容で 1 回だけ送信される
        // given (前提条件):
        let session = signed_in_session();
        let publisher = Arc::new(RecordingPublisher::default());
        let broadcaster = create_broadcaster(&session, publisher.clone());

        // when (操作):
        for text in ["p", "pr", "pri", "print(1)"] {
            broadcaster.broadcast(code(text));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        // then (期待する結果):
        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].mutation, code("print(1)"));
        assert_eq!(events[0].origin.as_str(), "alice-id");
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_debounced_independently() {
        // テスト項目: 種類ごとに独立して debounce され、互いを上書きしない
        // given (前提条件):
        let session = signed_in_session();
        let publisher = Arc::new(RecordingPublisher::default());
        let broadcaster = create_broadcaster(&session, publisher.clone());
        let language = Mutation::Language(LanguageId::new("python").unwrap());

        // when (操作):
        broadcaster.broadcast(language.clone());
        broadcaster.broadcast(code("print(1)"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let after_code_window = publisher.events().len();
        tokio::time::sleep(Duration::from_millis(150)).await;

        // then (期待する結果):
        assert_eq!(after_code_window, 1);
        let events = publisher.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].mutation, code("print(1)"));
        assert_eq!(events[1].mutation, language);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_publish_without_identity() {
        // テスト項目: Identity が無い場合はネットワーク呼び出しをせずに破棄される
        // given (前提条件):
        let session = SessionContext::new(Arc::new(FixedClock::new(1_000_000)));
        let publisher = Arc::new(RecordingPublisher::default());
        let broadcaster = create_broadcaster(&session, publisher.clone());

        // when (操作):
        broadcaster.broadcast(code("print(1)"));
        tokio::time::sleep(Duration::from_millis(100)).await;

        // then (期待する結果):
        assert!(publisher.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_not_retried() {
        // テスト項目: 送信に失敗しても再送されない
        // given (前提条件):
        let session = signed_in_session();
        let publisher = Arc::new(RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        });
        let broadcaster = create_broadcaster(&session, publisher.clone());

        // when (操作):
        broadcaster.broadcast(Mutation::Terminals(TerminalsSnapshot::default()));
        tokio::time::sleep(Duration::from_secs(2)).await;

        // then (期待する結果):
        assert_eq!(publisher.events().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_drops_pending() {
        // テスト項目: teardown で保留中のブロードキャストは全て取り消される
        // given (前提条件):
        let session = signed_in_session();
        let publisher = Arc::new(RecordingPublisher::default());
        let broadcaster = create_broadcaster(&session, publisher.clone());
        broadcaster.broadcast(code("print(1)"));
        broadcaster.broadcast(Mutation::Terminals(TerminalsSnapshot::default()));

        // when (操作):
        broadcaster.cancel_all();
        tokio::time::sleep(Duration::from_millis(500)).await;

        // then (期待する結果):
        assert!(publisher.events().is_empty());
    }
}
