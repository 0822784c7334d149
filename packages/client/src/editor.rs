//! Editor surface.
//!
//! [`EditorSurface`] is the seam between the sync engine and whatever renders
//! the code buffer. [`BufferEditor`] is the in-memory implementation used by
//! the CLI and the tests; it behaves like a real editor model in that a full
//! value replacement resets cursor, selections and scroll.
//!
//! Positions are 1-based.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollPosition {
    pub top: u32,
    pub left: u32,
}

/// Everything the editor can save and restore in one go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub cursor: Position,
    pub selections: Vec<Selection>,
    pub scroll: ScrollPosition,
}

pub trait EditorSurface: Send {
    /// Whether the surface is mounted and can take a new value
    fn is_ready(&self) -> bool;
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
    fn line_count(&self) -> u32;

    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);
    fn selections(&self) -> Vec<Selection>;
    fn set_selections(&mut self, selections: Vec<Selection>);
    fn scroll_position(&self) -> ScrollPosition;
    fn set_scroll_position(&mut self, scroll: ScrollPosition);
    fn save_view_state(&self) -> ViewState;
    fn restore_view_state(&mut self, state: &ViewState);
    fn focus(&mut self);
}

/// Number of lines in `text` (an empty buffer has one line)
pub fn line_count(text: &str) -> u32 {
    let count = text.split('\n').count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Default)]
pub struct BufferEditor {
    text: String,
    ready: bool,
    cursor: Position,
    selections: Vec<Selection>,
    scroll: ScrollPosition,
    focused: bool,
}

impl BufferEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ready: true,
            ..Self::default()
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    /// Insert `content` as a new line before line `at`; returns the touched line.
    ///
    /// `at` past the end appends.
    pub fn insert_line(&mut self, at: u32, content: &str) -> u32 {
        let mut lines = self.owned_lines();
        let index = (at.max(1) as usize - 1).min(lines.len());
        lines.insert(index, content.to_string());
        self.commit_local_edit(lines, index)
    }

    pub fn append_line(&mut self, content: &str) -> u32 {
        let mut lines = self.owned_lines();
        // a trailing newline leaves an empty last line; fill it instead of adding another
        let index = match lines.last() {
            Some(last) if last.is_empty() && lines.len() > 1 => {
                let index = lines.len() - 1;
                lines[index] = content.to_string();
                lines.push(String::new());
                index
            }
            _ => {
                lines.push(content.to_string());
                lines.len() - 1
            }
        };
        self.commit_local_edit(lines, index)
    }

    /// Returns `None` when `at` is out of range.
    pub fn replace_line(&mut self, at: u32, content: &str) -> Option<u32> {
        let mut lines = self.owned_lines();
        let index = self.line_index(at, lines.len())?;
        lines[index] = content.to_string();
        Some(self.commit_local_edit(lines, index))
    }

    /// Returns `None` when `at` is out of range.
    pub fn delete_line(&mut self, at: u32) -> Option<u32> {
        let mut lines = self.owned_lines();
        let index = self.line_index(at, lines.len())?;
        lines.remove(index);
        if lines.is_empty() {
            lines.push(String::new());
        }
        let index = index.min(lines.len() - 1);
        Some(self.commit_local_edit(lines, index))
    }

    fn owned_lines(&self) -> Vec<String> {
        self.text.split('\n').map(str::to_string).collect()
    }

    fn line_index(&self, at: u32, len: usize) -> Option<usize> {
        let index = (at as usize).checked_sub(1)?;
        (index < len).then_some(index)
    }

    fn commit_local_edit(&mut self, lines: Vec<String>, index: usize) -> u32 {
        self.text = lines.join("\n");
        let line = u32::try_from(index + 1).unwrap_or(u32::MAX);
        self.cursor = Position::new(line, 1);
        self.selections.clear();
        line
    }

    fn clamp(&self, position: Position) -> Position {
        let lines = self.lines();
        let line = position.line.clamp(1, line_count(&self.text));
        let width = lines
            .get(line as usize - 1)
            .map(|l| l.chars().count())
            .unwrap_or(0);
        let max_column = u32::try_from(width + 1).unwrap_or(u32::MAX);
        Position::new(line, position.column.clamp(1, max_column))
    }
}

impl EditorSurface for BufferEditor {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.text = value.to_string();
        self.cursor = Position::default();
        self.selections.clear();
        self.scroll = ScrollPosition::default();
    }

    fn line_count(&self) -> u32 {
        line_count(&self.text)
    }

    fn position(&self) -> Position {
        self.cursor
    }

    fn set_position(&mut self, position: Position) {
        self.cursor = self.clamp(position);
    }

    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        self.selections = selections
            .into_iter()
            .map(|s| Selection {
                anchor: self.clamp(s.anchor),
                head: self.clamp(s.head),
            })
            .collect();
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.scroll
    }

    fn set_scroll_position(&mut self, scroll: ScrollPosition) {
        self.scroll = scroll;
    }

    fn save_view_state(&self) -> ViewState {
        ViewState {
            cursor: self.cursor,
            selections: self.selections.clone(),
            scroll: self.scroll,
        }
    }

    fn restore_view_state(&mut self, state: &ViewState) {
        self.set_position(state.cursor);
        self.set_selections(state.selections.clone());
        self.scroll = state.scroll;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        // テスト項目: 行数の数え方（空文字も 1 行）
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\nb"), 2);
        assert_eq!(line_count("a\nb\n"), 3);
    }

    #[test]
    fn test_set_value_resets_view() {
        // テスト項目: 値の全置換でカーソル・選択・スクロールがリセットされる
        // given (前提条件):
        let mut editor = BufferEditor::new("a\nb\nc");
        editor.set_position(Position::new(3, 2));
        editor.set_scroll_position(ScrollPosition { top: 40, left: 0 });

        // when (操作):
        editor.set_value("x\ny\nz");

        // then (期待する結果):
        assert_eq!(editor.position(), Position::new(1, 1));
        assert_eq!(editor.scroll_position(), ScrollPosition::default());
    }

    #[test]
    fn test_set_position_is_clamped() {
        // テスト項目: 範囲外の位置は行数・行幅に丸められる
        // given (前提条件):
        let mut editor = BufferEditor::new("ab\nc");

        // when (操作):
        editor.set_position(Position::new(10, 10));

        // then (期待する結果):
        assert_eq!(editor.position(), Position::new(2, 2));
    }

    #[test]
    fn test_insert_line_returns_touched_line() {
        // テスト項目: 行の挿入は触れた行番号を返し、カーソルをその行に移す
        // given (前提条件):
        let mut editor = BufferEditor::new("a\nc");

        // when (操作):
        let line = editor.insert_line(2, "b");

        // then (期待する結果):
        assert_eq!(line, 2);
        assert_eq!(editor.value(), "a\nb\nc");
        assert_eq!(editor.position().line, 2);
    }

    #[test]
    fn test_append_line_fills_trailing_newline() {
        // テスト項目: 末尾改行がある場合、空の最終行に追記される
        // given (前提条件):
        let mut editor = BufferEditor::new("a\n");

        // when (操作):
        let line = editor.append_line("b");

        // then (期待する結果):
        assert_eq!(line, 2);
        assert_eq!(editor.value(), "a\nb\n");
    }

    #[test]
    fn test_replace_and_delete_out_of_range() {
        // テスト項目: 範囲外の行の置換・削除は None
        // given (前提条件):
        let mut editor = BufferEditor::new("a\nb");

        // when (操作) / then (期待する結果):
        assert_eq!(editor.replace_line(3, "x"), None);
        assert_eq!(editor.delete_line(0), None);
        assert_eq!(editor.replace_line(2, "x"), Some(2));
        assert_eq!(editor.delete_line(1), Some(1));
        assert_eq!(editor.value(), "x");
    }
}
