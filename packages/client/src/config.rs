//! CLI client configuration.

use clap::Parser;

use crate::executor::DEFAULT_SANDBOX_URL;

#[derive(Parser, Debug, Clone)]
#[command(name = "coderoom-client")]
#[command(about = "Join a Coderoom room and edit code together from the terminal", long_about = None)]
pub struct ClientConfig {
    /// HTTP origin of the relay
    #[arg(short = 's', long, env = "CODEROOM_SERVER", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    #[arg(short = 'e', long, env = "CODEROOM_EMAIL")]
    pub email: String,

    #[arg(short = 'P', long, env = "CODEROOM_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Sign up with this display name instead of signing in
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Id of the room to join
    #[arg(short = 'r', long, conflicts_with = "room_name")]
    pub room: Option<String>,

    /// Create a new room with this name and join it
    #[arg(short = 'n', long)]
    pub room_name: Option<String>,

    /// Base URL of the Piston-compatible sandbox
    #[arg(long, env = "CODEROOM_SANDBOX_URL", default_value = DEFAULT_SANDBOX_URL)]
    pub sandbox_url: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Which room to enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomTarget {
    Join(String),
    Create(String),
}

impl ClientConfig {
    pub fn room_target(&self) -> Option<RoomTarget> {
        match (&self.room, &self.room_name) {
            (Some(id), _) => Some(RoomTarget::Join(id.clone())),
            (None, Some(name)) => Some(RoomTarget::Create(name.clone())),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join() {
        // テスト項目: --room を指定すると既存の Room に参加する
        // given (前提条件):
        let args = [
            "coderoom-client",
            "--email",
            "a@x.com",
            "--password",
            "p1",
            "--room",
            "R1",
        ];

        // when (操作):
        let config = ClientConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.room_target(), Some(RoomTarget::Join("R1".to_string())));
        assert_eq!(config.server, "http://127.0.0.1:8080");
        assert_eq!(config.sandbox_url, DEFAULT_SANDBOX_URL);
        assert!(config.username.is_none());
    }

    #[test]
    fn test_parse_create_with_sign_up() {
        // テスト項目: --username と --room-name でサインアップと Room 作成を指定できる
        // given (前提条件):
        let args = [
            "coderoom-client",
            "-e",
            "a@x.com",
            "-P",
            "p1",
            "-u",
            "alice",
            "-n",
            "pairing",
        ];

        // when (操作):
        let config = ClientConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(
            config.room_target(),
            Some(RoomTarget::Create("pairing".to_string()))
        );
        assert_eq!(config.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_room_and_room_name_conflict() {
        // テスト項目: --room と --room-name は同時に指定できない
        // given (前提条件):
        let args = [
            "coderoom-client",
            "-e",
            "a@x.com",
            "-P",
            "p1",
            "-r",
            "R1",
            "-n",
            "pairing",
        ];

        // when (操作):
        let result = ClientConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
