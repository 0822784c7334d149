//! 共有状態のミューテーション
//!
//! Room の共有状態（コード・言語・ターミナル・アクティブファイル）に対する
//! 1 単位の変更を表す閉じたタグ付き共用体です。種類ごとに 1 つのペイロード型を持ち、
//! 全ての分岐で網羅的に扱われます。
//!
//! 全てのイベントは発信者の `UserId` を持ちます。受信側はこれを使って
//! 自分自身のエコーを無視し、変更の発信者を表示に使います。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value_object::{LanguageId, Timestamp, UserId, Username};

/// ミューテーションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MutationKind {
    Code,
    Language,
    Terminals,
    FileSelection,
}

impl MutationKind {
    /// 全ての種類（固定順）
    pub const ALL: [MutationKind; 4] = [
        MutationKind::Code,
        MutationKind::Language,
        MutationKind::Terminals,
        MutationKind::FileSelection,
    ];

    /// トピック上のイベント名
    pub fn event_name(&self) -> &'static str {
        match self {
            MutationKind::Code => "code-update",
            MutationKind::Language => "language-update",
            MutationKind::Terminals => "terminals-update",
            MutationKind::FileSelection => "file-selection",
        }
    }

    /// Relay の publish エンドポイントのパスセグメント（`/api/rooms/{id}/{segment}`）
    pub fn path_segment(&self) -> &'static str {
        match self {
            MutationKind::Code => "code",
            MutationKind::Language => "language",
            MutationKind::Terminals => "terminals",
            MutationKind::FileSelection => "file-selection",
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.path_segment() == segment)
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_name() == name)
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// コード全体の置き換え
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChange {
    /// 新しいコード全文
    pub code: String,
    /// 編集が触れた最初の行（1 始まり、不明なら 0）。カーソル補正のヒントにのみ使う
    pub change_line_number: u32,
    pub timestamp: Timestamp,
}

/// ターミナルの入出力スナップショット（3 つの値は常にまとめて送る）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TerminalsSnapshot {
    pub input: String,
    pub output: String,
    pub is_loading: bool,
}

/// エディタで開くファイルの記述子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub language: LanguageId,
    pub content: String,
}

/// ファイル選択
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSelection {
    pub file: FileDescriptor,
    /// 発信者の表示名（Relay が付与する）
    pub opened_by: Option<Username>,
}

/// 共有状態への 1 単位の変更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Code(CodeChange),
    Language(LanguageId),
    Terminals(TerminalsSnapshot),
    FileSelection(FileSelection),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Code(_) => MutationKind::Code,
            Mutation::Language(_) => MutationKind::Language,
            Mutation::Terminals(_) => MutationKind::Terminals,
            Mutation::FileSelection(_) => MutationKind::FileSelection,
        }
    }
}

/// 発信者付きのミューテーション（トピックに流れる単位）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub origin: UserId,
    pub mutation: Mutation,
}

impl MutationEvent {
    pub fn new(origin: UserId, mutation: Mutation) -> Self {
        Self { origin, mutation }
    }

    pub fn kind(&self) -> MutationKind {
        self.mutation.kind()
    }

    /// 指定ユーザー自身が発信したイベント（エコー）かどうか
    pub fn is_echo_for(&self, local_user: &UserId) -> bool {
        &self.origin == local_user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_consistent() {
        // テスト項目: パスセグメントとイベント名から同じ種類が復元できる
        // given (前提条件):
        let kinds = MutationKind::ALL;

        // when (操作) / then (期待する結果):
        for kind in kinds {
            assert_eq!(MutationKind::from_path_segment(kind.path_segment()), Some(kind));
            assert_eq!(MutationKind::from_event_name(kind.event_name()), Some(kind));
        }
        assert_eq!(MutationKind::from_path_segment("draw"), None);
        assert_eq!(MutationKind::from_event_name("code"), None);
    }

    #[test]
    fn test_event_names_match_wire_protocol() {
        // テスト項目: イベント名がトピック上のプロトコルと一致する
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(MutationKind::Code.event_name(), "code-update");
        assert_eq!(MutationKind::Language.event_name(), "language-update");
        assert_eq!(MutationKind::Terminals.event_name(), "terminals-update");
        assert_eq!(MutationKind::FileSelection.event_name(), "file-selection");
        assert_eq!(MutationKind::FileSelection.path_segment(), "file-selection");
    }

    #[test]
    fn test_is_echo_for_compares_origin() {
        // テスト項目: 発信者と同じユーザーの場合のみエコーと判定される
        // given (前提条件):
        let alice = UserId::new("alice-id").unwrap();
        let bob = UserId::new("bob-id").unwrap();
        let event = MutationEvent::new(
            alice.clone(),
            Mutation::Language(LanguageId::new("python").unwrap()),
        );

        // when (操作) / then (期待する結果):
        assert!(event.is_echo_for(&alice));
        assert!(!event.is_echo_for(&bob));
        assert_eq!(event.kind(), MutationKind::Language);
    }
}
