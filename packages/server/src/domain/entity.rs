//! エンティティ
//!
//! - `Room`: 共有コードバッファ・言語・アクティブファイル・ターミナル状態の最新値を持つ
//! - `User`: 認証済みユーザー
//! - `StoredFile`: ライブバッファとは独立して保存されたファイル

use serde::Serialize;

use super::{
    language,
    mutation::{FileDescriptor, Mutation, TerminalsSnapshot},
    value_object::{Email, FileId, LanguageId, RoomId, Timestamp, UserId, Username},
};

/// Room 作成時の言語
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Room 作成時のコード（javascript のボイラープレート）
pub const DEFAULT_CODE: &str = "// Write your JavaScript code here\nconsole.log(\"Hello, World!\");\n";

/// Room エンティティ
///
/// 種類ごとに最新値のみを保持します（編集履歴は持たない）。
/// 後から参加したセッションはこのスナップショットから現在の状態を取得します。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub code: String,
    pub language: LanguageId,
    pub active_file: Option<FileDescriptor>,
    pub terminals: TerminalsSnapshot,
    pub created_by: UserId,
    pub created_at: Timestamp,
    /// 最後にミューテーションが適用された時刻
    pub updated_at: Timestamp,
}

impl Room {
    pub fn new(
        id: RoomId,
        name: String,
        language: LanguageId,
        created_by: UserId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            code: DEFAULT_CODE.to_string(),
            language,
            active_file: None,
            terminals: TerminalsSnapshot::default(),
            created_by,
            created_at,
            updated_at: created_at,
        }
    }

    /// ミューテーションを適用する（種類ごとに last-write-wins）
    ///
    /// ライブセッションと同じ結果になるよう、言語の切り替えはコードを
    /// その言語のボイラープレートに戻し、ファイル選択はコードと言語も置き換えます。
    pub fn apply(&mut self, mutation: &Mutation, at: Timestamp) {
        match mutation {
            Mutation::Code(change) => self.code = change.code.clone(),
            Mutation::Language(id) => {
                self.language = id.clone();
                if let Some(code) = language::boilerplate(id.as_str()) {
                    self.code = code.to_string();
                }
            }
            Mutation::Terminals(snapshot) => self.terminals = snapshot.clone(),
            Mutation::FileSelection(selection) => {
                let file = &selection.file;
                self.code = file.content.clone();
                self.language = file.language.clone();
                self.active_file = Some(file.clone());
            }
        }
        self.updated_at = at;
    }
}

/// ユーザーエンティティ
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    /// argon2 の PHC 文字列
    pub password_hash: String,
    /// 作成した Room
    pub rooms: Vec<RoomId>,
    pub created_at: Timestamp,
}

impl User {
    pub fn new(
        id: UserId,
        username: Username,
        email: Email,
        password_hash: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            rooms: Vec::new(),
            created_at,
        }
    }
}

/// 保存済みファイル
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub id: FileId,
    pub room_id: RoomId,
    pub name: String,
    pub language: LanguageId,
    pub content: String,
    pub saved_by: UserId,
    pub saved_at: Timestamp,
}

impl StoredFile {
    pub fn descriptor(&self) -> FileDescriptor {
        FileDescriptor {
            name: self.name.clone(),
            language: self.language.clone(),
            content: self.content.clone(),
        }
    }
}
