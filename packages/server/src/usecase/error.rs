//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{PasswordError, RepositoryError, TokenError, ValueObjectError};

/// ミューテーション publish のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishMutationError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Failed to broadcast mutation: {0}")]
    BroadcastFailed(String),
}

/// トピック購読のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

/// トークンによる認証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticateError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("User '{0}' no longer exists")]
    UnknownUser(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignUpError {
    #[error("User with email '{0}' already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),

    #[error(transparent)]
    InvalidPassword(#[from] PasswordError),

    #[error("Sign-up failed: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignInError {
    #[error("User with email '{0}' not found")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),

    #[error("Sign-in failed: {0}")]
    Internal(String),
}

/// Room 取得のエラー（詳細・ファイル一覧で共通）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("Room name must not be empty")]
    EmptyName,

    #[error("Failed to create room: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveFileError {
    #[error("File name must not be empty")]
    EmptyName,

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),

    #[error("Failed to save file: {0}")]
    Repository(String),
}
