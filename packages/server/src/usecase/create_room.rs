//! UseCase: Room の作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - 作成された Room が javascript のボイラープレートで始まること
//! - 作成者の Room 一覧に追加されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：Room の作成
//! - 異常系：空の Room 名

use std::sync::Arc;

use coderoom_shared::time::Clock;

use crate::domain::{
    DEFAULT_LANGUAGE, LanguageId, Room, RoomIdFactory, RoomRepository, Timestamp, UserId,
    UserRepository,
};

use super::error::CreateRoomError;

pub struct CreateRoomUseCase {
    room_repository: Arc<dyn RoomRepository>,
    user_repository: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        user_repository: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            room_repository,
            user_repository,
            clock,
        }
    }

    pub async fn execute(&self, creator: &UserId, name: String) -> Result<Room, CreateRoomError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CreateRoomError::EmptyName);
        }

        let room = Room::new(
            RoomIdFactory::generate()?,
            name,
            LanguageId::new(DEFAULT_LANGUAGE)?,
            creator.clone(),
            Timestamp::new(self.clock.now_millis()),
        );
        self.room_repository.create(room.clone()).await?;
        self.user_repository
            .add_room(creator, room.id.clone())
            .await?;

        tracing::info!("Room '{}' ({}) created by '{}'", room.name, room.id, creator);
        Ok(room)
    }
}
