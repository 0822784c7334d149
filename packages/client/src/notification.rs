//! Transient notifications shown to the local user.

/// How long a file-selection notice stays visible
pub const FILE_SELECTION_NOTICE_MILLIS: i64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    /// Unix millis
    pub raised_at: i64,
    pub visible_for: i64,
}

impl Notification {
    pub fn new(message: impl Into<String>, raised_at: i64, visible_for: i64) -> Self {
        Self {
            message: message.into(),
            raised_at,
            visible_for,
        }
    }

    /// "{user} opened {file}"
    pub fn file_opened(user: &str, file_name: &str, raised_at: i64) -> Self {
        Self::new(
            format!("{} opened {}", user, file_name),
            raised_at,
            FILE_SELECTION_NOTICE_MILLIS,
        )
    }

    pub fn expires_at(&self) -> i64 {
        self.raised_at + self.visible_for
    }

    pub fn is_visible(&self, now_millis: i64) -> bool {
        now_millis >= self.raised_at && now_millis < self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_opened_visible_for_three_seconds() {
        // テスト項目: ファイル選択の通知は 3000 ms だけ表示される
        // given (前提条件):
        let notification = Notification::file_opened("bob", "main.py", 10_000);

        // when (操作) / then (期待する結果):
        assert_eq!(notification.message, "bob opened main.py");
        assert!(notification.is_visible(10_000));
        assert!(notification.is_visible(12_999));
        assert!(!notification.is_visible(13_000));
    }
}
