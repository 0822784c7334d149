//! UseCase: Room に保存されたファイルの一覧

use std::sync::Arc;

use crate::domain::{FileRepository, RoomId, RoomRepository, StoredFile};

use super::error::GetRoomDetailError;

pub struct ListRoomFilesUseCase {
    room_repository: Arc<dyn RoomRepository>,
    file_repository: Arc<dyn FileRepository>,
}

impl ListRoomFilesUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        file_repository: Arc<dyn FileRepository>,
    ) -> Self {
        Self {
            room_repository,
            file_repository,
        }
    }

    /// 保存順に返す
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<StoredFile>, GetRoomDetailError> {
        self.room_repository
            .find(room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound(room_id.to_string()))?;
        Ok(self.file_repository.list_by_room(room_id).await)
    }
}
