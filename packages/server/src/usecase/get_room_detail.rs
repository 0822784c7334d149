//! UseCase: Room の詳細取得
//!
//! 後から参加したセッションが現在の状態を取り込むためのスナップショットを返します。

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    room_repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(room_repository: Arc<dyn RoomRepository>) -> Self {
        Self { room_repository }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<Room, GetRoomDetailError> {
        self.room_repository
            .find(room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound(room_id.to_string()))
    }
}
