//! 識別子のファクトリ
//!
//! UUID v4 を使って新しい識別子を払い出します。

use uuid::Uuid;

use super::{
    error::ValueObjectError,
    value_object::{FileId, RoomId, SocketId, UserId},
};

/// RoomId のファクトリ
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> Result<RoomId, ValueObjectError> {
        RoomId::new(Uuid::new_v4().to_string())
    }
}

/// UserId のファクトリ
pub struct UserIdFactory;

impl UserIdFactory {
    pub fn generate() -> Result<UserId, ValueObjectError> {
        UserId::new(Uuid::new_v4().to_string())
    }
}

/// SocketId のファクトリ（WebSocket 購読ごとに 1 つ）
pub struct SocketIdFactory;

impl SocketIdFactory {
    pub fn generate() -> Result<SocketId, ValueObjectError> {
        SocketId::new(Uuid::new_v4().simple().to_string())
    }
}

/// FileId のファクトリ
pub struct FileIdFactory;

impl FileIdFactory {
    pub fn generate() -> Result<FileId, ValueObjectError> {
        FileId::new(Uuid::new_v4().to_string())
    }
}
