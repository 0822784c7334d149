//! InMemory File Repository 実装

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{FileRepository, RepositoryError, RoomId, StoredFile};

/// インメモリ File Repository 実装（保存順に保持）
#[derive(Default)]
pub struct InMemoryFileRepository {
    files: Arc<Mutex<Vec<StoredFile>>>,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn save(&self, file: StoredFile) -> Result<(), RepositoryError> {
        let mut files = self.files.lock().await;
        files.push(file);
        Ok(())
    }

    async fn list_by_room(&self, room_id: &RoomId) -> Vec<StoredFile> {
        let files = self.files.lock().await;
        files
            .iter()
            .filter(|file| &file.room_id == room_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileId, LanguageId, Timestamp, UserId};

    fn create_test_file(id: &str, room: &str, name: &str) -> StoredFile {
        StoredFile {
            id: FileId::new(id).unwrap(),
            room_id: RoomId::new(room).unwrap(),
            name: name.to_string(),
            language: LanguageId::new("python").unwrap(),
            content: "print(1)".to_string(),
            saved_by: UserId::new("alice-id").unwrap(),
            saved_at: Timestamp::new(1000),
        }
    }

    #[tokio::test]
    async fn test_list_by_room_filters_and_keeps_order() {
        // テスト項目: Room ごとのファイルが保存順に取得できる
        // given (前提条件):
        let repo = InMemoryFileRepository::new();
        repo.save(create_test_file("f1", "R1", "a.py")).await.unwrap();
        repo.save(create_test_file("f2", "R2", "b.py")).await.unwrap();
        repo.save(create_test_file("f3", "R1", "c.py")).await.unwrap();

        // when (操作):
        let names: Vec<String> = repo
            .list_by_room(&RoomId::new("R1").unwrap())
            .await
            .into_iter()
            .map(|file| file.name)
            .collect();

        // then (期待する結果):
        assert_eq!(names, vec!["a.py", "c.py"]);
    }
}
