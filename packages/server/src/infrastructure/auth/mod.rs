//! 認証サービスの実装
//!
//! - `jwt`: HS256 の JWT によるトークン発行・検証
//! - `password`: argon2 によるパスワードハッシュ

pub mod jwt;
pub mod password;

pub use jwt::JwtTokenService;
pub use password::Argon2PasswordHasher;
