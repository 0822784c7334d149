//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{Room, StoredFile, User},
    error::RepositoryError,
    mutation::Mutation,
    value_object::{Email, RoomId, Timestamp, UserId},
};

/// Room Repository trait
///
/// Room は種類ごとの最新値だけを保持します。
/// 同じ種類への同時書き込みは直列化されず、後から永続化されたものが残ります。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を作成
    async fn create(&self, room: Room) -> Result<(), RepositoryError>;

    /// Room を取得
    async fn find(&self, room_id: &RoomId) -> Result<Room, RepositoryError>;

    /// 全ての Room を作成順に取得
    async fn list(&self) -> Vec<Room>;

    /// ミューテーションを Room に適用し、適用後の Room を返す
    async fn apply_mutation(
        &self,
        room_id: &RoomId,
        mutation: &Mutation,
        at: Timestamp,
    ) -> Result<Room, RepositoryError>;
}

/// User Repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを登録（メールアドレスが重複していればエラー）
    async fn insert(&self, user: User) -> Result<(), RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, user_id: &UserId) -> Result<User, RepositoryError>;

    /// ユーザーが作成した Room を追加
    async fn add_room(&self, user_id: &UserId, room_id: RoomId) -> Result<(), RepositoryError>;
}

/// File Repository trait
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn save(&self, file: StoredFile) -> Result<(), RepositoryError>;

    /// Room のファイルを保存順に取得
    async fn list_by_room(&self, room_id: &RoomId) -> Vec<StoredFile>;
}
