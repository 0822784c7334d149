//! UseCase: ファイルの保存
//!
//! ライブバッファとは独立したファイルとして保存します。
//! 保存してもトピックへの配信は行いません。

use std::sync::Arc;

use coderoom_shared::time::Clock;

use crate::domain::{
    FileIdFactory, FileRepository, LanguageId, RoomId, RoomRepository, StoredFile, Timestamp,
    UserId,
};

use super::error::SaveFileError;

/// 保存するファイルの内容
#[derive(Debug, Clone)]
pub struct SaveFileCommand {
    pub room_id: String,
    pub name: String,
    pub language: String,
    pub content: String,
}

pub struct SaveFileUseCase {
    room_repository: Arc<dyn RoomRepository>,
    file_repository: Arc<dyn FileRepository>,
    clock: Arc<dyn Clock>,
}

impl SaveFileUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        file_repository: Arc<dyn FileRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            room_repository,
            file_repository,
            clock,
        }
    }

    pub async fn execute(
        &self,
        saved_by: &UserId,
        command: SaveFileCommand,
    ) -> Result<StoredFile, SaveFileError> {
        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(SaveFileError::EmptyName);
        }
        let room_id = RoomId::new(command.room_id)?;
        let language = LanguageId::new(command.language)?;

        self.room_repository
            .find(&room_id)
            .await
            .map_err(|_| SaveFileError::RoomNotFound(room_id.to_string()))?;

        let file = StoredFile {
            id: FileIdFactory::generate()?,
            room_id,
            name,
            language,
            content: command.content,
            saved_by: saved_by.clone(),
            saved_at: Timestamp::new(self.clock.now_millis()),
        };
        self.file_repository
            .save(file.clone())
            .await
            .map_err(|e| SaveFileError::Repository(e.to_string()))?;

        tracing::info!("File '{}' saved to room '{}'", file.name, file.room_id);
        Ok(file)
    }
}
