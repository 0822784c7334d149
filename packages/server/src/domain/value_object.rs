//! 値オブジェクト
//!
//! ドメインで扱う識別子・名前などの不変な値を表します。
//! 生成時にバリデーションを行い、不正な値がドメインに入り込まないようにします。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// トピック名の接頭辞（`room-{room_id}`）
const TOPIC_PREFIX: &str = "room-";

/// 空文字を許さない文字列識別子を定義するマクロ
macro_rules! non_empty_string_value {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// 新しい値を生成（前後の空白は取り除く）
            pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ValueObjectError::Empty($label));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

non_empty_string_value!(
    /// Room の識別子（不透明な文字列）
    RoomId,
    "room id"
);
non_empty_string_value!(
    /// ユーザーの識別子
    UserId,
    "user id"
);
non_empty_string_value!(
    /// WebSocket 購読ごとに払い出される識別子
    SocketId,
    "socket id"
);
non_empty_string_value!(
    /// 保存済みファイルの識別子
    FileId,
    "file id"
);
non_empty_string_value!(
    /// 表示名
    Username,
    "username"
);

/// 言語識別子（`javascript`, `python` など。小文字に正規化）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageId(String);

impl LanguageId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() {
            return Err(ValueObjectError::Empty("language"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ValueObjectError::Invalid {
                field: "language",
                reason: "must not contain whitespace".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LanguageId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageId> for String {
    fn from(value: LanguageId) -> Self {
        value.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メールアドレス（小文字に正規化、`@` を 1 つだけ含む）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
        let value = value.into().trim().to_lowercase();
        let mut parts = value.split('@');
        let (local, domain) = (parts.next(), parts.next());
        match (local, domain, parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(value))
            }
            _ => Err(ValueObjectError::Invalid {
                field: "email",
                reason: format!("'{}' is not an email address", value),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Room ごとのブロードキャスト用トピック（`room-{room_id}`）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Room に対応するトピックを生成
    pub fn for_room(room_id: &RoomId) -> Self {
        Self(format!("{}{}", TOPIC_PREFIX, room_id.as_str()))
    }

    /// トピック名を解析して Room ID を取り出す
    pub fn parse(value: &str) -> Result<(Self, RoomId), ValueObjectError> {
        let room_part = value
            .strip_prefix(TOPIC_PREFIX)
            .ok_or_else(|| ValueObjectError::Invalid {
                field: "topic",
                reason: format!("'{}' does not start with '{}'", value, TOPIC_PREFIX),
            })?;
        let room_id = RoomId::new(room_part)?;
        Ok((Self::for_room(&room_id), room_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
