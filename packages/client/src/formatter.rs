//! Message formatting utilities for client display.

use coderoom_server::{
    domain::{MutationKind, TerminalsSnapshot},
    infrastructure::dto::http::{RoomSummaryDto, SavedFileDto},
};

use crate::{editor::Position, room_session::RemoteNotice};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Banner shown after joining a room
    pub fn format_room_joined(room_name: &str, room_id: &str, username: &str) -> String {
        format!(
            "\n{}\nRoom: {} ({})\nYou are '{}'. Type :help for commands.\n{}\n",
            RULE, room_name, room_id, username, RULE
        )
    }

    /// The buffer with line numbers; the cursor line is marked with `>`
    pub fn format_buffer(code: &str, language: &str, cursor: Position) -> String {
        let lines: Vec<&str> = code.split('\n').collect();
        let width = lines.len().to_string().len();

        let mut output = String::new();
        output.push_str(&format!("\n{} [{}]\n", THIN_RULE, language));
        for (index, line) in lines.iter().enumerate() {
            let number = index + 1;
            let marker = if number == cursor.line as usize { '>' } else { ' ' };
            output.push_str(&format!("{}{:>width$} | {}\n", marker, number, line, width = width));
        }
        output.push_str(&format!(
            "{} cursor {}:{}\n",
            THIN_RULE, cursor.line, cursor.column
        ));
        output
    }

    /// One line describing a change that arrived from another session
    pub fn format_remote_notice(notice: &RemoteNotice) -> String {
        if let Some(message) = &notice.message {
            return format!("\n* {}\n", message);
        }
        let what = match notice.kind {
            MutationKind::Code => "edited the code",
            MutationKind::Language => "changed the language",
            MutationKind::Terminals => "updated the terminal",
            MutationKind::FileSelection => "opened a file",
        };
        format!("\n* {} {}\n", notice.origin, what)
    }

    pub fn format_terminals(terminals: &TerminalsSnapshot) -> String {
        let status = if terminals.is_loading { " (running...)" } else { "" };
        format!(
            "\n{}\ninput:\n{}\noutput{}:\n{}\n{}\n",
            THIN_RULE, terminals.input, status, terminals.output, THIN_RULE
        )
    }

    pub fn format_saved_file(file: &SavedFileDto) -> String {
        format!("\nsaved {} at {}\n", file.name, file.saved_at)
    }

    pub fn format_file_list(files: &[SavedFileDto]) -> String {
        if files.is_empty() {
            return "\n(No saved files)\n".to_string();
        }
        let mut output = String::from("\n");
        for file in files {
            output.push_str(&format!(
                "{} [{}] saved at {}\n",
                file.name, file.language, file.saved_at
            ));
        }
        output
    }

    /// Rooms on the relay; the current one is marked with `*`
    pub fn format_room_list(rooms: &[RoomSummaryDto], current_id: &str) -> String {
        if rooms.is_empty() {
            return "\n(No rooms)\n".to_string();
        }
        let mut output = String::from("\n");
        for room in rooms {
            let marker = if room.id == current_id { '*' } else { ' ' };
            output.push_str(&format!(
                "{} {} ({}) [{}]\n",
                marker, room.name, room.id, room.language
            ));
        }
        output
    }

    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    pub fn format_help() -> String {
        [
            "",
            "<text>                  append a line",
            ":show                   print the buffer",
            ":goto <line> [col]      move the cursor",
            ":insert <line> <text>   insert a line before <line>",
            ":replace <line> <text>  replace a line",
            ":delete <line>          delete a line",
            ":set <text>             replace the buffer (\\n for newlines)",
            ":lang <language>        switch language (resets the buffer)",
            ":input <text>           set the program input",
            ":run                    run the buffer",
            ":term                   print input and output",
            ":save <name>            save the buffer as a file",
            ":files                  list saved files",
            ":open <file name>       open a saved file for everyone",
            ":rooms                  list rooms on the server",
            ":quit                   leave the room",
            "",
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use coderoom_server::domain::UserId;

    use super::*;

    #[test]
    fn test_format_room_joined() {
        // テスト項目: 参加時のバナーに Room 名・ID・ユーザー名が含まれる
        // given (前提条件):
        let room_name = "pairing";

        // when (操作):
        let result = MessageFormatter::format_room_joined(room_name, "R1", "alice");

        // then (期待する結果):
        assert!(result.contains("Room: pairing (R1)"));
        assert!(result.contains("You are 'alice'"));
    }

    #[test]
    fn test_format_buffer_marks_cursor_line() {
        // テスト項目: バッファに行番号が付き、カーソル行に `>` が付く
        // given (前提条件):
        let code = "a\nb";

        // when (操作):
        let result = MessageFormatter::format_buffer(code, "python", Position::new(2, 1));

        // then (期待する結果):
        assert!(result.contains("[python]"));
        assert!(result.contains(" 1 | a\n"));
        assert!(result.contains(">2 | b\n"));
        assert!(result.contains("cursor 2:1"));
    }

    #[test]
    fn test_format_remote_notice_prefers_message() {
        // テスト項目: 通知文言がある場合はそれを表示し、無い場合は種類から文言を作る
        // given (前提条件):
        let with_message = RemoteNotice {
            kind: MutationKind::FileSelection,
            origin: UserId::new("alice-id").unwrap(),
            message: Some("alice opened main.py".to_string()),
        };
        let without = RemoteNotice {
            kind: MutationKind::Code,
            origin: UserId::new("alice-id").unwrap(),
            message: None,
        };

        // when (操作) / then (期待する結果):
        assert_eq!(
            MessageFormatter::format_remote_notice(&with_message),
            "\n* alice opened main.py\n"
        );
        assert_eq!(
            MessageFormatter::format_remote_notice(&without),
            "\n* alice-id edited the code\n"
        );
    }

    #[test]
    fn test_format_terminals_running() {
        // テスト項目: 実行中はその旨が表示される
        // given (前提条件):
        let terminals = TerminalsSnapshot {
            input: "1".to_string(),
            output: String::new(),
            is_loading: true,
        };

        // when (操作):
        let result = MessageFormatter::format_terminals(&terminals);

        // then (期待する結果):
        assert!(result.contains("output (running...):"));
    }

    #[test]
    fn test_format_room_list_marks_current_room() {
        // テスト項目: Room 一覧では参加中の Room に `*` が付く
        // given (前提条件):
        let rooms = vec![
            RoomSummaryDto {
                id: "R1".to_string(),
                name: "pairing".to_string(),
                language: "python".to_string(),
                created_at: "2024-01-01T00:00:00+00:00".to_string(),
            },
            RoomSummaryDto {
                id: "R2".to_string(),
                name: "review".to_string(),
                language: "javascript".to_string(),
                created_at: "2024-01-01T00:00:00+00:00".to_string(),
            },
        ];

        // when (操作):
        let result = MessageFormatter::format_room_list(&rooms, "R2");

        // then (期待する結果):
        assert_eq!(result, "\n  pairing (R1) [python]\n* review (R2) [javascript]\n");
        assert_eq!(MessageFormatter::format_room_list(&[], "R1"), "\n(No rooms)\n");
    }

    #[test]
    fn test_format_file_list_empty() {
        // テスト項目: 保存済みファイルが無い場合の表示
        // given (前提条件) / when (操作):
        let result = MessageFormatter::format_file_list(&[]);

        // then (期待する結果):
        assert_eq!(result, "\n(No saved files)\n");
    }
}
