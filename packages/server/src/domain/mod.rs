//! ドメイン層
//!
//! Room の共有状態とミューテーション、ユーザー、保存済みファイルを表すモデルと、
//! 外部への依存（Repository, MessagePusher, 認証サービス）のインターフェースを定義します。

pub mod entity;
pub mod error;
pub mod factory;
pub mod language;
pub mod message_pusher;
pub mod mutation;
pub mod repository;
pub mod service;
pub mod value_object;

pub use entity::{DEFAULT_CODE, DEFAULT_LANGUAGE, Room, StoredFile, User};
pub use error::{MessagePushError, PasswordError, RepositoryError, TokenError, ValueObjectError};
pub use factory::{FileIdFactory, RoomIdFactory, SocketIdFactory, UserIdFactory};
pub use language::LanguageSpec;
pub use message_pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use mutation::{
    CodeChange, FileDescriptor, FileSelection, Mutation, MutationEvent, MutationKind,
    TerminalsSnapshot,
};
pub use repository::{FileRepository, RoomRepository, UserRepository};
pub use service::{IssuedToken, PasswordHasher, TokenClaims, TokenService};
pub use value_object::{
    Email, FileId, LanguageId, RoomId, SocketId, Timestamp, Topic, UserId, Username,
};
