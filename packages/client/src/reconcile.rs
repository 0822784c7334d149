//! Applying remote mutations to the local session.
//!
//! Every event first goes through the origin filter: an event whose origin is
//! the local user is an echo and changes nothing. Code updates replace the
//! whole buffer and hand back a [`ViewRestore`] which the caller commits once
//! the new text has been rendered. The other kinds are applied directly.

use coderoom_server::{
    domain::{
        CodeChange, FileDescriptor, LanguageId, Mutation, MutationEvent, TerminalsSnapshot,
        UserId, language,
    },
    infrastructure::dto::http::RoomDetailDto,
};

use crate::{
    editor::{EditorSurface, Position, ScrollPosition, Selection, ViewState},
    error::ClientError,
    notification::Notification,
};

/// Why an event changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discarded {
    /// Sent by the local user
    Echo,
    /// Code arrived before the editor could take it; it is not replayed
    EditorNotReady,
}

#[derive(Debug)]
pub enum Applied {
    Code(ViewRestore),
    Language,
    Terminals,
    FileSelection,
}

/// Shared state of the room other than the code buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRoomState {
    pub language: LanguageId,
    pub terminals: TerminalsSnapshot,
    pub active_file: Option<FileDescriptor>,
    pub notification: Option<Notification>,
}

impl LocalRoomState {
    pub fn new(language: LanguageId) -> Self {
        Self {
            language,
            terminals: TerminalsSnapshot::default(),
            active_file: None,
            notification: None,
        }
    }

    /// State of a late joiner, taken from the room snapshot. Returns the code too.
    pub fn from_snapshot(room: RoomDetailDto) -> Result<(Self, String), ClientError> {
        let active_file = room
            .active_file
            .map(FileDescriptor::try_from)
            .transpose()?;
        let state = Self {
            language: LanguageId::new(room.language)?,
            terminals: TerminalsSnapshot {
                input: room.terminals.input,
                output: room.terminals.output,
                is_loading: room.terminals.is_loading,
            },
            active_file,
            notification: None,
        };
        Ok((state, room.code))
    }

    /// Notification to show at `now_millis`, if any
    pub fn visible_notification(&self, now_millis: i64) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|notification| notification.is_visible(now_millis))
    }
}

/// Cursor line after a replacement that changed the line count from `old` to `new`.
///
/// Only a cursor strictly below `change_line` moves.
pub fn shifted_cursor_line(cursor_line: u32, change_line: u32, old: u32, new: u32) -> u32 {
    if cursor_line <= change_line {
        return cursor_line;
    }
    let shifted = i64::from(cursor_line) + i64::from(new) - i64::from(old);
    u32::try_from(shifted.max(1)).unwrap_or(u32::MAX)
}

/// Second phase of a code update: view state captured before the replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the view is only restored when `finish` is called"]
pub struct ViewRestore {
    view_state: ViewState,
    cursor: Position,
    selections: Vec<Selection>,
    scroll: ScrollPosition,
    change_line: u32,
    old_line_count: u32,
    new_line_count: u32,
}

impl ViewRestore {
    pub fn line_delta(&self) -> i64 {
        i64::from(self.new_line_count) - i64::from(self.old_line_count)
    }

    /// Restore the captured view on `editor` and focus it.
    pub fn finish(self, editor: &mut dyn EditorSurface) {
        editor.restore_view_state(&self.view_state);
        let line = shifted_cursor_line(
            self.cursor.line,
            self.change_line,
            self.old_line_count,
            self.new_line_count,
        );
        editor.set_position(Position::new(line, self.cursor.column));
        editor.set_selections(self.selections);
        editor.set_scroll_position(self.scroll);
        editor.focus();
    }
}

pub struct ReconciliationEngine {
    local_user: UserId,
}

impl ReconciliationEngine {
    pub fn new(local_user: UserId) -> Self {
        Self { local_user }
    }

    pub fn local_user(&self) -> &UserId {
        &self.local_user
    }

    pub fn apply(
        &self,
        state: &mut LocalRoomState,
        editor: &mut dyn EditorSurface,
        event: &MutationEvent,
        now_millis: i64,
    ) -> Result<Applied, Discarded> {
        if event.is_echo_for(&self.local_user) {
            tracing::trace!("Ignoring echo of {}", event.kind());
            return Err(Discarded::Echo);
        }

        match &event.mutation {
            Mutation::Code(change) => self.replace_code(editor, change).map(Applied::Code),
            Mutation::Language(language) => {
                state.language = language.clone();
                // switching language starts over from that language's starter code
                if let Some(code) = language::boilerplate(language.as_str()) {
                    editor.set_value(code);
                }
                Ok(Applied::Language)
            }
            Mutation::Terminals(snapshot) => {
                state.terminals = snapshot.clone();
                Ok(Applied::Terminals)
            }
            Mutation::FileSelection(selection) => {
                let file = &selection.file;
                state.language = file.language.clone();
                editor.set_value(&file.content);
                let user = selection
                    .opened_by
                    .as_ref()
                    .map(|name| name.as_str())
                    .unwrap_or(event.origin.as_str());
                state.notification = Some(Notification::file_opened(user, &file.name, now_millis));
                state.active_file = Some(file.clone());
                Ok(Applied::FileSelection)
            }
        }
    }

    fn replace_code(
        &self,
        editor: &mut dyn EditorSurface,
        change: &CodeChange,
    ) -> Result<ViewRestore, Discarded> {
        if !editor.is_ready() {
            tracing::debug!("Editor not ready, dropping code update");
            return Err(Discarded::EditorNotReady);
        }

        let cursor = editor.position();
        let selections = editor.selections();
        let scroll = editor.scroll_position();
        let view_state = editor.save_view_state();
        let old_line_count = editor.line_count();

        editor.set_value(&change.code);

        Ok(ViewRestore {
            view_state,
            cursor,
            selections,
            scroll,
            change_line: change.change_line_number,
            old_line_count,
            new_line_count: editor.line_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use coderoom_server::domain::{FileSelection, Timestamp, Username};

    use super::*;
    use crate::editor::BufferEditor;

    fn alice() -> UserId {
        UserId::new("alice-id").unwrap()
    }

    fn bob() -> UserId {
        UserId::new("bob-id").unwrap()
    }

    fn code_event(origin: UserId, code: &str, change_line_number: u32) -> MutationEvent {
        MutationEvent::new(
            origin,
            Mutation::Code(CodeChange {
                code: code.to_string(),
                change_line_number,
                timestamp: Timestamp::new(1000),
            }),
        )
    }

    fn create_state() -> LocalRoomState {
        LocalRoomState::new(LanguageId::new("javascript").unwrap())
    }

    #[test]
    fn test_echo_is_discarded() {
        // テスト項目: 自分が発信したイベントは何も変更しない
        // given (前提条件):
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("keep");
        let event = code_event(bob(), "print(1)", 0);

        // when (操作):
        let result = engine.apply(&mut state, &mut editor, &event, 0);

        // then (期待する結果):
        assert!(matches!(result, Err(Discarded::Echo)));
        assert_eq!(editor.value(), "keep");
        assert_eq!(state, create_state());
    }

    #[test]
    fn test_echo_of_terminals_is_discarded() {
        // テスト項目: コード以外の種類にもエコー判定が適用される
        // given (前提条件):
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("");
        let event = MutationEvent::new(
            bob(),
            Mutation::Terminals(TerminalsSnapshot {
                input: "x".to_string(),
                output: String::new(),
                is_loading: true,
            }),
        );

        // when (操作):
        let result = engine.apply(&mut state, &mut editor, &event, 0);

        // then (期待する結果):
        assert!(matches!(result, Err(Discarded::Echo)));
        assert_eq!(state.terminals, TerminalsSnapshot::default());
    }

    #[test]
    fn test_code_update_dropped_when_editor_not_ready() {
        // テスト項目: エディタが準備できていない場合、コード更新は破棄される
        // given (前提条件):
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("old");
        editor.set_ready(false);

        // when (操作):
        let result = engine.apply(&mut state, &mut editor, &code_event(alice(), "new", 0), 0);

        // then (期待する結果):
        assert!(matches!(result, Err(Discarded::EditorNotReady)));
        assert_eq!(editor.value(), "old");
    }

    #[test]
    fn test_cursor_below_change_is_shifted() {
        // テスト項目: 変更行より下のカーソルは行数の増減分だけずれる
        // given (前提条件):
        // 3 行目を編集して 2 行増えた。カーソルは 5 行目
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("1\n2\n3\n4\n5\n6");
        editor.set_position(Position::new(5, 2));
        let new_code = "1\n2\n3\n3a\n3b\n4\n5\n6";

        // when (操作):
        let applied = engine
            .apply(&mut state, &mut editor, &code_event(alice(), new_code, 3), 0)
            .unwrap();
        let Applied::Code(restore) = applied else {
            panic!("expected a code update");
        };
        assert_eq!(restore.line_delta(), 2);
        restore.finish(&mut editor);

        // then (期待する結果):
        assert_eq!(editor.value(), new_code);
        assert_eq!(editor.position(), Position::new(7, 2));
        assert!(editor.is_focused());
    }

    #[test]
    fn test_cursor_at_or_above_change_is_kept() {
        // テスト項目: 変更行以上のカーソルはそのまま
        // given (前提条件):
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("1\n2\n3\n4");
        editor.set_position(Position::new(3, 1));

        // when (操作):
        let Ok(Applied::Code(restore)) =
            engine.apply(&mut state, &mut editor, &code_event(alice(), "1\n2\n3\nx\n4", 3), 0)
        else {
            panic!("expected a code update");
        };
        restore.finish(&mut editor);

        // then (期待する結果):
        assert_eq!(editor.position(), Position::new(3, 1));
    }

    #[test]
    fn test_selections_and_scroll_are_restored_unshifted() {
        // テスト項目: 選択範囲はずらさずに、スクロール位置はそのまま復元される
        // given (前提条件):
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("a\nb\nc\nd\ne");
        let selection = Selection {
            anchor: Position::new(4, 1),
            head: Position::new(4, 2),
        };
        editor.set_selections(vec![selection]);
        editor.set_scroll_position(ScrollPosition { top: 12, left: 3 });

        // when (操作):
        let Ok(Applied::Code(restore)) = engine.apply(
            &mut state,
            &mut editor,
            &code_event(alice(), "z\na\nb\nc\nd\ne", 1),
            0,
        ) else {
            panic!("expected a code update");
        };
        restore.finish(&mut editor);

        // then (期待する結果):
        assert_eq!(editor.selections(), vec![selection]);
        assert_eq!(editor.scroll_position(), ScrollPosition { top: 12, left: 3 });
    }

    #[test]
    fn test_shifted_cursor_line_law() {
        // テスト項目: カーソル補正の規則（C > L なら C + D、それ以外は C）
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(shifted_cursor_line(5, 3, 6, 8), 7);
        assert_eq!(shifted_cursor_line(3, 3, 6, 8), 3);
        assert_eq!(shifted_cursor_line(2, 3, 6, 1), 2);
        assert_eq!(shifted_cursor_line(5, 0, 6, 4), 3);
        // 1 行目より上には行かない
        assert_eq!(shifted_cursor_line(2, 1, 10, 1), 1);
    }

    #[test]
    fn test_language_update_resets_boilerplate() {
        // テスト項目: リモートの言語変更で言語が切り替わり、バッファがボイラープレートに戻る
        // given (前提条件):
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("console.log(1)");
        let event = MutationEvent::new(
            alice(),
            Mutation::Language(LanguageId::new("python").unwrap()),
        );

        // when (操作):
        let result = engine.apply(&mut state, &mut editor, &event, 0);

        // then (期待する結果):
        assert!(matches!(result, Ok(Applied::Language)));
        assert_eq!(state.language.as_str(), "python");
        assert_eq!(Some(editor.value().as_str()), language::boilerplate("python"));
    }

    #[test]
    fn test_file_selection_raises_notification() {
        // テスト項目: ファイル選択で言語とコードが切り替わり、通知が 3000 ms 表示される
        // given (前提条件):
        let engine = ReconciliationEngine::new(bob());
        let mut state = create_state();
        let mut editor = BufferEditor::new("");
        let file = FileDescriptor {
            name: "main.py".to_string(),
            language: LanguageId::new("python").unwrap(),
            content: "print(2)".to_string(),
        };
        let event = MutationEvent::new(
            alice(),
            Mutation::FileSelection(FileSelection {
                file: file.clone(),
                opened_by: Some(Username::new("alice").unwrap()),
            }),
        );

        // when (操作):
        let result = engine.apply(&mut state, &mut editor, &event, 5_000);

        // then (期待する結果):
        assert!(matches!(result, Ok(Applied::FileSelection)));
        assert_eq!(editor.value(), "print(2)");
        assert_eq!(state.active_file, Some(file));
        assert_eq!(state.language.as_str(), "python");
        assert_eq!(
            state.visible_notification(7_999).map(|n| n.message.as_str()),
            Some("alice opened main.py")
        );
        assert!(state.visible_notification(8_000).is_none());
    }
}
