//! 認証まわりのサービス trait
//!
//! トークンの発行・検証とパスワードハッシュはドメインの外の仕組みに依存するため、
//! trait として定義し Infrastructure 層で実装します。

use super::{
    entity::User,
    error::{PasswordError, TokenError},
    value_object::{Email, UserId},
};

/// 発行済みトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// 有効期限（Unix 秒）
    pub expires_at: i64,
}

/// 検証済みトークンから取り出した情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub email: Email,
}

pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> Result<IssuedToken, TokenError>;

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}

pub trait PasswordHasher: Send + Sync {
    /// PHC 文字列を返す
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    fn verify(&self, password: &str, password_hash: &str) -> bool;
}
