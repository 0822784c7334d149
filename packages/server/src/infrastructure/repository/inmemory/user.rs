//! InMemory User Repository 実装

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Email, RepositoryError, RoomId, User, UserId, UserRepository};

/// インメモリ User Repository 実装
///
/// メールアドレスをキーにユーザーを保持します。
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<Email, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        if users.contains_key(&user.email) {
            return Err(RepositoryError::DuplicateEmail(user.email.as_str().to_string()));
        }
        users.insert(user.email.clone(), user);
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<User, RepositoryError> {
        let users = self.users.lock().await;
        users
            .get(email)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(email.as_str().to_string()))
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<User, RepositoryError> {
        let users = self.users.lock().await;
        users
            .values()
            .find(|user| &user.id == user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_string()))
    }

    async fn add_room(&self, user_id: &UserId, room_id: RoomId) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        let user = users
            .values_mut()
            .find(|user| &user.id == user_id)
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_string()))?;
        if !user.rooms.contains(&room_id) {
            user.rooms.push(room_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, Username};

    fn create_test_user(id: &str, email: &str) -> User {
        User::new(
            UserId::new(id).unwrap(),
            Username::new("alice").unwrap(),
            Email::new(email).unwrap(),
            "hash".to_string(),
            Timestamp::new(1000),
        )
    }

    #[tokio::test]
    async fn test_insert_duplicate_email() {
        // テスト項目: 同じメールアドレスのユーザーは登録できない
        // given (前提条件):
        let repo = InMemoryUserRepository::new();
        repo.insert(create_test_user("u1", "a@x.com")).await.unwrap();

        // when (操作):
        let result = repo.insert(create_test_user("u2", "A@x.com")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::DuplicateEmail("a@x.com".to_string()))
        );
    }

    #[tokio::test]
    async fn test_find_by_email_and_id() {
        // テスト項目: メールアドレスと ID のどちらでもユーザーを取得できる
        // given (前提条件):
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("u1", "a@x.com");
        repo.insert(user.clone()).await.unwrap();

        // when (操作):
        let by_email = repo.find_by_email(&user.email).await;
        let by_id = repo.find_by_id(&user.id).await;

        // then (期待する結果):
        assert_eq!(by_email, Ok(user.clone()));
        assert_eq!(by_id, Ok(user));
        assert!(
            repo.find_by_email(&Email::new("b@x.com").unwrap())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_add_room_is_idempotent() {
        // テスト項目: 同じ Room を二度追加しても 1 件のまま
        // given (前提条件):
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("u1", "a@x.com");
        repo.insert(user.clone()).await.unwrap();
        let room_id = RoomId::new("R1").unwrap();

        // when (操作):
        repo.add_room(&user.id, room_id.clone()).await.unwrap();
        repo.add_room(&user.id, room_id.clone()).await.unwrap();

        // then (期待する結果):
        let stored = repo.find_by_id(&user.id).await.unwrap();
        assert_eq!(stored.rooms, vec![room_id]);
    }
}
